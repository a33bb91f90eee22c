//! x86-64 assembly code generation.
//!
//! One linear pass over the IR that keeps only two bits of
//! cross-instruction state — the current function's local-slot count (for
//! the epilogue's stack restore) and whether any `CALL` has targeted
//! `print` (so the runtime helper is appended at most once) — rather than
//! building any register-allocation or control-flow structure.

use nanoc_ir::{Instr, Opcode, Operand};
use nanoc_util::symbol::Interner;

use crate::error::{CodegenError, CodegenResult};
use crate::runtime::PRINT_HELPER;

/// Fixed-width prefix on every instruction line; labels are column-0.
const INDENT: &str = "         ";

/// Generate the full assembly listing for one program's IR.
pub fn generate(instrs: &[Instr], interner: &Interner) -> CodegenResult<String> {
    let mut gen = AsmGenerator::new(interner);
    gen.run(instrs)?;
    Ok(gen.finish())
}

struct AsmGenerator<'i> {
    interner: &'i Interner,
    lines: Vec<String>,
    current_nbr_locals: u32,
    is_main: bool,
    call_print: bool,
}

impl<'i> AsmGenerator<'i> {
    fn new(interner: &'i Interner) -> Self {
        Self {
            interner,
            lines: vec![
                ".global _start".to_string(),
                ".data".to_string(),
                "buf: .skip 1024".to_string(),
                ".text".to_string(),
            ],
            current_nbr_locals: 0,
            is_main: false,
            call_print: false,
        }
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn instr(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("{INDENT}{}", text.as_ref()));
    }

    fn name_of(&self, sym: nanoc_util::Symbol) -> &str {
        self.interner.resolve(sym).unwrap_or("<?>")
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn run(&mut self, instrs: &[Instr]) -> CodegenResult<()> {
        for instr in instrs {
            self.generate_instr(instr)?;
        }
        if self.call_print {
            self.emit(String::new());
            for line in PRINT_HELPER.lines() {
                self.emit(line.to_string());
            }
        }
        Ok(())
    }

    fn generate_instr(&mut self, instr: &Instr) -> CodegenResult<()> {
        match instr.op {
            Opcode::Begin => self.gen_begin(instr)?,
            Opcode::End => {}
            Opcode::Call => self.gen_call_instr(instr)?,
            Opcode::Bl | Opcode::Ble | Opcode::Bg | Opcode::Bge | Opcode::Beq | Opcode::Bne => {
                self.gen_conditional_branch(instr)?
            }
            Opcode::B => {
                let label = self.label_operand(instr.dest.as_ref())?;
                self.instr(format!("jmp {label}"));
            }
            Opcode::Label => {
                let label = self.label_operand(instr.dest.as_ref())?;
                self.emit(format!("{label}:"));
            }
            Opcode::Mov => self.gen_mov(instr)?,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => self.gen_arithmetic(instr)?,
            Opcode::Ret => self.gen_ret(instr)?,
        }
        Ok(())
    }

    fn gen_begin(&mut self, instr: &Instr) -> CodegenResult<()> {
        let Some(Operand::Func { callee, nbr_locals, .. }) = &instr.dest else {
            return Err(CodegenError::Malformed("begin without a function operand".into()));
        };
        let name = self.name_of(*callee).to_string();
        if name == "main" {
            self.emit("_start:");
            self.is_main = true;
        } else {
            self.emit(String::new());
            self.emit(format!("{name}:"));
        }
        self.instr("pushq %rbp");
        self.instr("movq %rsp, %rbp");
        self.current_nbr_locals = nbr_locals.unwrap_or(0);
        if self.current_nbr_locals > 0 {
            let size = 8 * self.current_nbr_locals;
            self.instr(format!("subq ${size}, %rsp"));
        }
        Ok(())
    }

    fn gen_ret(&mut self, instr: &Instr) -> CodegenResult<()> {
        if self.is_main {
            self.instr("movq $0, %rdi");
            self.instr("movq $60, %rax");
            self.instr("syscall");
            return Ok(());
        }
        let dest = instr
            .dest
            .as_ref()
            .ok_or_else(|| CodegenError::Malformed("ret without a value".into()))?;
        match dest {
            Operand::Literal(v) => self.instr(format!("movq ${v}, %rax")),
            Operand::Func { .. } => self.gen_call_operand(dest)?,
            Operand::Temp(_) => self.instr("popq %rax"),
            Operand::Var { slot, .. } => {
                let addr = 8 * slot;
                self.instr(format!("movq {addr}(%rbp), %rax"));
            }
            Operand::Label(_) => {
                return Err(CodegenError::Malformed("ret with a label operand".into()))
            }
        }
        if self.current_nbr_locals > 0 {
            self.instr("movq %rbp, %rsp");
        }
        self.instr("popq %rbp");
        self.instr("ret");
        Ok(())
    }

    fn gen_mov(&mut self, instr: &Instr) -> CodegenResult<()> {
        let dest_slot = self.var_slot(instr.dest.as_ref())?;
        let dest_addr = 8 * dest_slot;
        let src = instr
            .src1
            .as_ref()
            .ok_or_else(|| CodegenError::Malformed("mov without a source".into()))?;
        match src {
            Operand::Literal(v) => self.instr(format!("movq ${v}, {dest_addr}(%rbp)")),
            Operand::Func { .. } => {
                self.gen_call_operand(src)?;
                self.instr(format!("movq %rax, {dest_addr}(%rbp)"));
            }
            Operand::Temp(_) => self.instr(format!("popq {dest_addr}(%rbp)")),
            Operand::Var { slot, .. } => {
                let addr = 8 * slot;
                self.instr(format!("movq {addr}(%rbp), %rax"));
                self.instr(format!("movq %rax, {dest_addr}(%rbp)"));
            }
            Operand::Label(_) => {
                return Err(CodegenError::Malformed("mov with a label source".into()))
            }
        }
        Ok(())
    }

    /// `src1` ends up in `%rax`, `src2` in `%rbx`, with a case analysis on
    /// which operand(s) are stack temporaries.
    fn gen_arithmetic(&mut self, instr: &Instr) -> CodegenResult<()> {
        let src1 = instr
            .src1
            .as_ref()
            .ok_or_else(|| CodegenError::Malformed("arithmetic without src1".into()))?;
        let src2 = instr
            .src2
            .as_ref()
            .ok_or_else(|| CodegenError::Malformed("arithmetic without src2".into()))?;

        if src1.is_temp() && src2.is_temp() {
            self.instr("popq %rbx");
            self.instr("popq %rax");
        } else if src1.is_temp() {
            self.materialize_into(src2, "%rbx")?;
            self.instr("popq %rax");
        } else if src2.is_temp() {
            self.materialize_into(src1, "%rax")?;
            self.instr("popq %rbx");
        } else {
            self.materialize_into(src1, "%rax")?;
            match src2 {
                Operand::Func { .. } => {
                    self.instr("pushq %rax");
                    self.gen_call_operand(src2)?;
                    self.instr("movq %rax, %rbx");
                    self.instr("popq %rax");
                }
                other => self.materialize_into(other, "%rbx")?,
            }
        }

        match instr.op {
            Opcode::Add => self.instr("addq %rbx, %rax"),
            Opcode::Sub => self.instr("subq %rbx, %rax"),
            Opcode::Mul => self.instr("imulq %rbx, %rax"),
            Opcode::Div => {
                self.instr("xor %rdx, %rdx");
                self.instr("idivq %rbx");
            }
            _ => unreachable!("gen_arithmetic only dispatched for arithmetic opcodes"),
        }
        self.instr("pushq %rax");
        Ok(())
    }

    /// Move a non-temporary operand's value into `reg` (a literal,
    /// resolved variable, or nested call result) — shared by the
    /// non-temporary legs of [`Self::gen_arithmetic`].
    fn materialize_into(&mut self, operand: &Operand, reg: &str) -> CodegenResult<()> {
        match operand {
            Operand::Literal(v) => self.instr(format!("movq ${v}, {reg}")),
            Operand::Func { .. } => {
                self.gen_call_operand(operand)?;
                if reg != "%rax" {
                    self.instr(format!("movq %rax, {reg}"));
                }
            }
            Operand::Var { slot, .. } => {
                let addr = 8 * slot;
                self.instr(format!("movq {addr}(%rbp), {reg}"));
            }
            Operand::Temp(_) => self.instr(format!("popq {reg}")),
            Operand::Label(_) => {
                return Err(CodegenError::Malformed("unexpected label operand in arithmetic".into()))
            }
        }
        Ok(())
    }

    /// Materializes `src1` into `%r8` and `src2` into `%r9`, then
    /// `cmpq`s and branches — the both-temporaries case pops in reverse
    /// order first, matching `gen_conditional_branch`.
    fn gen_conditional_branch(&mut self, instr: &Instr) -> CodegenResult<()> {
        let src1 = instr
            .src1
            .as_ref()
            .ok_or_else(|| CodegenError::Malformed("branch without src1".into()))?;
        let src2 = instr
            .src2
            .as_ref()
            .ok_or_else(|| CodegenError::Malformed("branch without src2".into()))?;

        let both_temps = src1.is_temp() && src2.is_temp();
        if both_temps {
            self.instr("popq %r9");
            self.instr("popq %r8");
        }
        self.materialize_branch_operand(src1, "%r8", both_temps)?;
        self.materialize_branch_operand(src2, "%r9", both_temps)?;

        self.instr("cmpq %r9, %r8");
        let label = self.label_operand(instr.dest.as_ref())?;
        let mnemonic = match instr.op {
            Opcode::Bl => "jl",
            Opcode::Ble => "jle",
            Opcode::Bg => "jg",
            Opcode::Bge => "jge",
            Opcode::Beq => "je",
            Opcode::Bne => "jne",
            _ => unreachable!("gen_conditional_branch only dispatched for branch opcodes"),
        };
        self.instr(format!("{mnemonic} {label}"));
        Ok(())
    }

    fn materialize_branch_operand(&mut self, operand: &Operand, reg: &str, already_popped: bool) -> CodegenResult<()> {
        match operand {
            Operand::Literal(v) => self.instr(format!("movq ${v}, {reg}")),
            Operand::Func { .. } => {
                self.gen_call_operand(operand)?;
                self.instr(format!("movq %rax, {reg}"));
            }
            Operand::Temp(_) => {
                if !already_popped {
                    self.instr(format!("popq {reg}"));
                }
            }
            Operand::Var { slot, .. } => {
                let addr = 8 * slot;
                self.instr(format!("movq {addr}(%rbp), {reg}"));
            }
            Operand::Label(_) => {
                return Err(CodegenError::Malformed("unexpected label operand in a condition".into()))
            }
        }
        Ok(())
    }

    fn gen_call_instr(&mut self, instr: &Instr) -> CodegenResult<()> {
        let Some(Operand::Func { callee, args, .. }) = &instr.dest else {
            return Err(CodegenError::Malformed("CALL without a function operand".into()));
        };
        let name = self.name_of(*callee).to_string();
        if name == "print" {
            self.call_print = true;
            let arg = args
                .first()
                .ok_or_else(|| CodegenError::Malformed("print called with no arguments".into()))?
                .clone();
            self.materialize_print_arg(&arg)?;
            self.instr("call print");
            self.instr("addq $8, %rsp");
        } else {
            let args = args.clone();
            for arg in args.iter().rev() {
                self.push_arg(arg)?;
            }
            self.instr(format!("call {name}"));
            if !args.is_empty() {
                let size = 8 * args.len();
                self.instr(format!("addq ${size}, %rsp"));
            }
        }
        Ok(())
    }

    fn materialize_print_arg(&mut self, arg: &Operand) -> CodegenResult<()> {
        match arg {
            Operand::Literal(v) => {
                self.instr(format!("movq ${v}, %rax"));
                self.instr("pushq %rax");
            }
            Operand::Func { .. } => {
                self.gen_call_operand(arg)?;
                self.instr("pushq %rax");
            }
            // Already sitting on top of the stack from a prior computation.
            Operand::Temp(_) => {}
            Operand::Var { slot, .. } => {
                let addr = 8 * slot;
                self.instr(format!("movq {addr}(%rbp), %rax"));
                self.instr("pushq %rax");
            }
            Operand::Label(_) => {
                return Err(CodegenError::Malformed("unexpected label operand as a print argument".into()))
            }
        }
        Ok(())
    }

    /// Push one user-call argument, evaluated right-to-left by the
    /// caller.
    fn push_arg(&mut self, arg: &Operand) -> CodegenResult<()> {
        match arg {
            Operand::Literal(v) => {
                self.instr(format!("movq ${v}, %rax"));
                self.instr("pushq %rax");
            }
            Operand::Func { .. } => {
                self.gen_call_operand(arg)?;
                self.instr("pushq %rax");
            }
            Operand::Var { slot, .. } => {
                let addr = 8 * slot;
                self.instr(format!("movq {addr}(%rbp), %rax"));
                self.instr("pushq %rax");
            }
            // Already on the stack from a prior computation.
            Operand::Temp(_) => {}
            Operand::Label(_) => {
                return Err(CodegenError::Malformed("unexpected label operand as a call argument".into()))
            }
        }
        Ok(())
    }

    /// Expand a function call that appears as an expression operand
    /// (nested inside a larger expression, an assignment, or a `return`)
    /// into its call sequence, leaving the result in `%rax`.
    fn gen_call_operand(&mut self, op: &Operand) -> CodegenResult<()> {
        let Operand::Func { callee, args, .. } = op else {
            return Err(CodegenError::Malformed("call operand without a function payload".into()));
        };
        let name = self.name_of(*callee).to_string();
        if name == "print" {
            return Err(CodegenError::PrintHasNoValue);
        }
        let args = args.clone();
        for arg in args.iter().rev() {
            self.push_arg(arg)?;
        }
        self.instr(format!("call {name}"));
        if !args.is_empty() {
            let size = 8 * args.len();
            self.instr(format!("addq ${size}, %rsp"));
        }
        Ok(())
    }

    fn label_operand(&self, operand: Option<&Operand>) -> CodegenResult<String> {
        match operand {
            Some(Operand::Label(id)) => Ok(format!("L{id}")),
            _ => Err(CodegenError::Malformed("expected a label operand".into())),
        }
    }

    fn var_slot(&self, operand: Option<&Operand>) -> CodegenResult<i32> {
        match operand {
            Some(Operand::Var { slot, .. }) => Ok(*slot),
            _ => Err(CodegenError::Malformed("mov destination must be a variable".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanoc_lex::tokenize;
    use nanoc_util::symbol::Interner;

    fn generate_src(src: &str) -> String {
        let mut interner = Interner::new();
        let tokens = tokenize(src, &mut interner).unwrap();
        let program = nanoc_par::parse(&tokens, &interner).unwrap();
        nanoc_sem::analyze(&program, &interner).unwrap();
        let instrs = nanoc_ir::build(&program);
        generate(&instrs, &interner).unwrap()
    }

    #[test]
    fn trivial_exit_renames_main_to_start_and_skips_the_print_helper() {
        let asm = generate_src("int main() { return 0; }");
        assert!(asm.contains("_start:"));
        assert!(asm.contains("movq $0, %rdi"));
        assert!(asm.contains("movq $60, %rax"));
        assert!(asm.contains("syscall"));
        assert!(!asm.contains("print:"));
    }

    #[test]
    fn print_literal_emits_the_call_sequence_and_the_helper() {
        let asm = generate_src("int main() { print(7); return 0; }");
        assert!(asm.contains("movq $7, %rax"));
        assert!(asm.contains("pushq %rax"));
        assert!(asm.contains("call print"));
        assert!(asm.contains("addq $8, %rsp"));
        assert!(asm.contains("\nprint:\n"));
    }

    #[test]
    fn print_helper_is_appended_at_most_once() {
        let asm = generate_src("int main() { print(1); print(2); return 0; }");
        assert_eq!(asm.matches("\nprint:\n").count(), 1);
    }

    #[test]
    fn local_with_initializer_reserves_frame_space() {
        let asm = generate_src("int main() { int x = 5; return x; }");
        assert!(asm.contains("subq $8, %rsp"));
        assert!(asm.contains("movq $5, -8(%rbp)"));
    }

    #[test]
    fn arithmetic_uses_rax_and_rbx_and_pushes_the_result() {
        let asm = generate_src("int main() { int x = 1 + 2; return x; }");
        assert!(asm.contains("movq $1, %rax"));
        assert!(asm.contains("movq $2, %rbx"));
        assert!(asm.contains("addq %rbx, %rax"));
        assert!(asm.contains("pushq %rax"));
    }

    #[test]
    fn using_print_as_a_value_is_a_codegen_error() {
        let mut interner = Interner::new();
        let tokens = tokenize("int main() { int x = print(1); return x; }", &mut interner).unwrap();
        let program = nanoc_par::parse(&tokens, &interner).unwrap();
        nanoc_sem::analyze(&program, &interner).unwrap();
        let instrs = nanoc_ir::build(&program);
        assert_eq!(generate(&instrs, &interner), Err(CodegenError::PrintHasNoValue));
    }

    #[test]
    fn non_main_function_gets_a_blank_line_and_its_own_name() {
        let asm = generate_src("int helper() { return 1; } int main() { helper(); return 0; }");
        assert!(asm.contains("\nhelper:\n"));
    }

    #[test]
    fn equality_condition_emits_je() {
        let asm = generate_src("int main() { if (1 == 2) { return 1; } return 0; }");
        assert!(asm.contains("cmpq %r9, %r8"));
        assert!(asm.contains("je L"));
    }
}
