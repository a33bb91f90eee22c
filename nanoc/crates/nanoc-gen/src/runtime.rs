//! The hand-written `print` helper, appended once to the assembly listing
//! iff any `CALL` targeted `print`.
//!
//! The buffer is filled least-significant-digit first from the high end,
//! the newline is pre-placed before the digit loop runs, and the sign is
//! decided by checking the original (not yet negated) value a second time
//! after the loop completes.

pub const PRINT_HELPER: &str = "\
print:
         pushq %rbp
         movq %rsp, %rbp
         movq 16(%rbp), %rax
         leaq buf(%rip), %rsi
         addq $1023, %rsi
         movb $0x0A, (%rsi)
         movq $1, %rcx
         movq $10, %rdi
         cmpq $0, %rax
         jge itoa
         negq %rax
itoa:
         xor %rdx, %rdx
         idivq %rdi
         addq $0x30, %rdx
         decq %rsi
         movb %dl, (%rsi)
         incq %rcx
         cmpq $0, %rax
         jg itoa
         movq 16(%rbp), %rax
         cmpq $0, %rax
         jge print_end
         decq %rsi
         incq %rcx
         movb $0x2D, (%rsi)
print_end:
         movq $1, %rdi
         movq %rcx, %rdx
         movq $1, %rax
         syscall
         popq %rbp
         ret";
