//! Pseudo-BASIC IR lines.
//!
//! One [`Instr`] renders to one text line awaiting line numbering.
//! Labels are symbolic (`L1`, `L2`, …) until the resolver rewrites
//! them.

/// One labeled pseudo-BASIC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// `REM L<k>` — a label definition, kept in the output as a
    /// comment.
    Label(String),
    /// `GOTO L<k>`
    Goto(String),
    /// `IF <cond> = 1 THEN L<k>` — booleans are numerically encoded in
    /// the target, 1 meaning true.
    IfThen { cond: String, target: String },
    /// `<target> = <rhs>`
    Assign { target: String, rhs: String },
    /// `PRINT "<text>"`
    PrintStr(String),
    /// `PRINT <operand>`
    PrintOperand(String),
    /// `STOP`
    Stop,
    /// `CALL <name>` — opaque call marker.
    Call(String),
}

impl std::fmt::Display for Instr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instr::Label(label) => write!(f, "REM {label}"),
            Instr::Goto(label) => write!(f, "GOTO {label}"),
            Instr::IfThen { cond, target } => write!(f, "IF {cond} = 1 THEN {target}"),
            Instr::Assign { target, rhs } => write!(f, "{target} = {rhs}"),
            Instr::PrintStr(text) => write!(f, "PRINT \"{text}\""),
            Instr::PrintOperand(operand) => write!(f, "PRINT {operand}"),
            Instr::Stop => write!(f, "STOP"),
            Instr::Call(name) => write!(f, "CALL {name}"),
        }
    }
}

/// Renders an instruction sequence to raw text lines.
pub fn render(instrs: &[Instr]) -> Vec<String> {
    instrs.iter().map(Instr::to_string).collect()
}
