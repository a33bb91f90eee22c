//! Lowering the decorated AST into IR.
//!
//! Includes the if-without-else emission quirk and the bare-expression
//! condition lowering, both reproduced verbatim rather than "fixed" — see
//! DESIGN.md.

use nanoc_par::{BinOp, Condition, Exp, Func, FuncCall, Program, RelOp, Stmt};

use crate::ir::{Instr, Opcode, Operand};

/// Lower a whole program (every function's AST, already decorated by
/// `nanoc-sem` with frame slots and `nbr_locals`) into one flat
/// instruction list.
pub fn build(program: &Program) -> Vec<Instr> {
    let mut builder = IrBuilder::new();
    for func in program {
        builder.lower_func(func);
    }
    builder.instrs
}

/// Owns the two monotonic counters (`t<k>`, `L<k>`) and the growing
/// instruction list for one translation pass — this state is scoped to
/// the builder rather than any process-wide global.
struct IrBuilder {
    instrs: Vec<Instr>,
    next_temp: u32,
    next_label: u32,
}

impl IrBuilder {
    fn new() -> Self {
        Self {
            instrs: Vec::new(),
            next_temp: 0,
            next_label: 0,
        }
    }

    fn new_temp(&mut self) -> Operand {
        let t = Operand::Temp(self.next_temp);
        self.next_temp += 1;
        t
    }

    fn new_label(&mut self) -> u32 {
        let l = self.next_label;
        self.next_label += 1;
        l
    }

    fn emit(&mut self, op: Opcode, src1: Option<Operand>, src2: Option<Operand>, dest: Option<Operand>) {
        self.instrs.push(Instr::new(op, src1, src2, dest));
    }

    fn lower_func(&mut self, func: &Func) {
        self.emit(
            Opcode::Begin,
            None,
            None,
            Some(Operand::Func {
                callee: func.name,
                args: Vec::new(),
                nbr_locals: Some(func.nbr_locals.get().unwrap_or(0)),
            }),
        );
        for stmt in &func.body.stmts {
            self.lower_stmt(stmt);
        }
        self.emit(
            Opcode::End,
            None,
            None,
            Some(Operand::Func {
                callee: func.name,
                args: Vec::new(),
                nbr_locals: None,
            }),
        );
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl { name, init, slot, .. } => {
                if let Some(exp) = init {
                    let src = self.lower_exp(exp);
                    let dest = Operand::Var {
                        name: *name,
                        slot: slot.get().expect("semantic analysis assigns every slot"),
                    };
                    self.emit(Opcode::Mov, Some(src), None, Some(dest));
                }
            }
            Stmt::Assignment { name, exp, slot, .. } => {
                let src = self.lower_exp(exp);
                let dest = Operand::Var {
                    name: *name,
                    slot: slot.get().expect("semantic analysis assigns every slot"),
                };
                self.emit(Opcode::Mov, Some(src), None, Some(dest));
            }
            Stmt::Call(call) => {
                let dest = self.lower_call(call);
                self.emit(Opcode::Call, None, None, Some(dest));
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => self.lower_if(cond, then_branch, else_branch.as_deref()),
            Stmt::Return { exp, .. } => {
                let value = self.lower_exp(exp);
                self.emit(Opcode::Ret, None, None, Some(value));
            }
            Stmt::Block(block) => {
                for stmt in &block.stmts {
                    self.lower_stmt(stmt);
                }
            }
        }
    }

    /// Reproduces the original emission order exactly, including the
    /// redundant trailing `b Lend` on the no-else path — quirky, but
    /// preserved rather than fixed.
    fn lower_if(&mut self, cond: &Condition, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        let begin_label = self.lower_condition(cond);
        let end_label = self.new_label();
        self.emit(Opcode::B, None, None, Some(Operand::Label(end_label)));
        self.emit(Opcode::Label, None, None, Some(Operand::Label(begin_label)));
        self.lower_stmt(then_branch);

        match else_branch {
            None => {
                self.emit(Opcode::B, None, None, Some(Operand::Label(end_label)));
                self.emit(Opcode::Label, None, None, Some(Operand::Label(end_label)));
            }
            Some(else_branch) => {
                let end_else_label = self.new_label();
                self.emit(Opcode::B, None, None, Some(Operand::Label(end_else_label)));
                self.emit(Opcode::Label, None, None, Some(Operand::Label(end_label)));
                self.lower_stmt(else_branch);
                self.emit(Opcode::B, None, None, Some(Operand::Label(end_else_label)));
                self.emit(Opcode::Label, None, None, Some(Operand::Label(end_else_label)));
            }
        }
    }

    /// Lower a condition to a single conditional-branch instruction whose
    /// target is a freshly allocated label, and return that label (spec
    /// section 4.5).
    fn lower_condition(&mut self, cond: &Condition) -> u32 {
        let label = self.new_label();
        let op1 = self.lower_exp(&cond.left);
        match &cond.rel {
            Some((rel, right)) => {
                let op2 = self.lower_exp(right);
                let opcode = match rel {
                    RelOp::LessThan => Opcode::Bl,
                    RelOp::LessEqual => Opcode::Ble,
                    RelOp::GreaterThan => Opcode::Bg,
                    RelOp::GreaterEqual => Opcode::Bge,
                    RelOp::Equal => Opcode::Beq,
                    RelOp::NotEqual => Opcode::Bne,
                };
                self.emit(opcode, Some(op1), Some(op2), Some(Operand::Label(label)));
            }
            None => {
                // Bare expression condition: true when strictly positive.
                self.emit(
                    Opcode::Bg,
                    Some(op1),
                    Some(Operand::Literal(0)),
                    Some(Operand::Label(label)),
                );
            }
        }
        label
    }

    fn lower_call(&mut self, call: &FuncCall) -> Operand {
        let args = call.args.iter().map(|arg| self.lower_exp(arg)).collect();
        Operand::Func {
            callee: call.name,
            args,
            nbr_locals: None,
        }
    }

    fn lower_exp(&mut self, exp: &Exp) -> Operand {
        match exp {
            Exp::Literal { value, .. } => Operand::Literal(*value),
            Exp::Var { name, slot, .. } => Operand::Var {
                name: *name,
                slot: slot.get().expect("semantic analysis assigns every slot"),
            },
            // A nested call is never emitted as its own `CALL` instruction
            // here — it becomes a `Func` operand that the code generator
            // expands into a call sequence at the point of use (matches
            // `translate_exp`'s behavior of returning a reference to the
            // call rather than appending an instruction).
            Exp::Call(call) => self.lower_call(call),
            Exp::Binary { op, left, right, .. } => {
                let lhs = self.lower_exp(left);
                let rhs = self.lower_exp(right);
                let opcode = match op {
                    BinOp::Add => Opcode::Add,
                    BinOp::Sub => Opcode::Sub,
                    BinOp::Mul => Opcode::Mul,
                    BinOp::Div => Opcode::Div,
                };
                let dest = self.new_temp();
                self.emit(opcode, Some(lhs), Some(rhs), Some(dest.clone()));
                dest
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanoc_lex::tokenize;
    use nanoc_util::symbol::Interner;

    fn build_src(src: &str) -> Vec<Instr> {
        let mut interner = Interner::new();
        let tokens = tokenize(src, &mut interner).unwrap();
        let program = nanoc_par::parse(&tokens, &interner).unwrap();
        nanoc_sem::analyze(&program, &interner).unwrap();
        build(&program)
    }

    #[test]
    fn begin_and_end_bracket_every_function() {
        let instrs = build_src("int main() { return 0; }");
        assert_eq!(instrs.first().unwrap().op, Opcode::Begin);
        assert_eq!(instrs.last().unwrap().op, Opcode::End);
    }

    #[test]
    fn begin_carries_nbr_locals() {
        let instrs = build_src("int main() { int x = 1; int y = 2; return x + y; }");
        let Some(Operand::Func { nbr_locals, .. }) = &instrs[0].dest else {
            panic!("expected begin's dest to be a Func operand");
        };
        assert_eq!(*nbr_locals, Some(2));
    }

    #[test]
    fn temporaries_within_one_build_are_unique() {
        let instrs = build_src(
            "int main() { int a = 1; int b = 2; int c = a + b + (a - b); return c; }",
        );
        let mut temp_ids = Vec::new();
        for instr in &instrs {
            for operand in [&instr.src1, &instr.src2, &instr.dest].into_iter().flatten() {
                if let Operand::Temp(k) = operand {
                    temp_ids.push(*k);
                }
            }
        }
        let mut unique = temp_ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), temp_ids.len());
    }

    #[test]
    fn if_without_else_reproduces_the_documented_quirk() {
        let instrs = build_src("int main() { if (1 > 0) { return 1; } return 0; }");
        let ops: Vec<Opcode> = instrs.iter().map(|i| i.op).collect();
        assert_eq!(
            ops,
            vec![
                Opcode::Begin,
                Opcode::Bg,
                Opcode::B,
                Opcode::Label,
                Opcode::Ret,
                Opcode::B,
                Opcode::Label,
                Opcode::Ret,
                Opcode::End,
            ]
        );
    }

    #[test]
    fn if_with_else_matches_the_documented_emission_order() {
        let instrs = build_src("int main() { if (1 > 0) { return 1; } else { return 2; } }");
        let ops: Vec<Opcode> = instrs.iter().map(|i| i.op).collect();
        assert_eq!(
            ops,
            vec![
                Opcode::Begin,
                Opcode::Bg,
                Opcode::B,
                Opcode::Label,
                Opcode::Ret,
                Opcode::B,
                Opcode::Label,
                Opcode::Ret,
                Opcode::B,
                Opcode::Label,
                Opcode::End,
            ]
        );
    }

    #[test]
    fn not_equal_maps_to_bne() {
        let instrs = build_src("int main() { if (1 != 2) { return 1; } return 0; }");
        assert!(instrs.iter().any(|i| i.op == Opcode::Bne));
    }

    #[test]
    fn equal_maps_to_beq() {
        let instrs = build_src("int main() { if (1 == 2) { return 1; } return 0; }");
        assert!(instrs.iter().any(|i| i.op == Opcode::Beq));
    }

    #[test]
    fn nested_call_in_expression_position_is_not_its_own_call_instruction() {
        let instrs = build_src("int helper() { return 1; } int main() { return helper() + 1; }");
        assert!(!instrs.iter().any(|i| i.op == Opcode::Call));
        let has_func_operand = instrs
            .iter()
            .any(|i| [&i.src1, &i.src2].into_iter().flatten().any(|op| op.is_func_call()));
        assert!(has_func_operand);
    }

    #[test]
    fn statement_position_call_emits_one_call_instruction() {
        let instrs = build_src("int main() { print(1); return 0; }");
        assert_eq!(instrs.iter().filter(|i| i.op == Opcode::Call).count(), 1);
    }
}
