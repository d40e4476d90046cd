use std::fmt;

use serde::{Deserialize, Serialize};

/// an operand reference. literals form their own always-available
/// namespace and are never looked up in the identifier ready-set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Lit(i64),
    Ident(String),
}

impl Operand {
    pub fn ident(id: impl Into<String>) -> Self {
        Self::Ident(id.into())
    }
    pub fn lit(v: i64) -> Self {
        Self::Lit(v)
    }
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Operand::Ident(id) => Some(id),
            Operand::Lit(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Lit(v) => write!(f, "{v}"),
            Operand::Ident(id) => f.write_str(id),
        }
    }
}

/// represents one instruction: it produces `dest` and consumes
/// `operands`. the schedulers never interpret `op`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instr {
    pub op: String,
    pub dest: String,
    pub operands: Vec<Operand>,
}

impl Instr {
    pub fn new(op: impl Into<String>, dest: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            op: op.into(),
            dest: dest.into(),
            operands,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.dest)?;
        for oprnd in &self.operands {
            write!(f, ", {oprnd}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let i = Instr::new("mul", "r", vec![Operand::ident("a"), Operand::lit(5)]);
        assert_eq!(i.to_string(), "mul r, a, 5");
        assert_eq!(Instr::new("halt", "h", vec![]).to_string(), "halt h");
    }

    #[test]
    fn test_operand_serde() {
        let o: Operand = serde_json::from_str("5").unwrap();
        assert_eq!(o, Operand::lit(5));
        let o: Operand = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(o, Operand::ident("a"));
        assert_eq!(serde_json::to_string(&Operand::lit(-3)).unwrap(), "-3");
    }
}
