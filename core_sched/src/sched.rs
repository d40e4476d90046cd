//! The schedule artifact shared by both schedulers.

use std::{fmt, ops::Index, slice};

use crate::instr::Instr;

/// controls when a destination becomes available during static
/// bundling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityPolicy {
    /// reference behavior: an instruction's destination becomes
    /// available even when its own operands were not satisfied.
    #[default]
    Permissive,
    /// a destination becomes available only once the producing
    /// instruction itself was satisfied.
    Strict,
}

/// instructions assigned to issue together in one simulated cycle.
/// order within a bundle is the order of assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bundle(Vec<Instr>);

impl Bundle {
    pub(crate) fn push(&mut self, instr: Instr) {
        self.0.push(instr)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn iter(&self) -> slice::Iter<'_, Instr> {
        self.0.iter()
    }
    pub fn as_slice(&self) -> &[Instr] {
        &self.0
    }
    pub fn into_inner(self) -> Vec<Instr> {
        self.0
    }
}

impl From<Vec<Instr>> for Bundle {
    fn from(instrs: Vec<Instr>) -> Self {
        Self(instrs)
    }
}

impl Index<usize> for Bundle {
    type Output = Instr;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Bundle {
    type Item = &'a Instr;
    type IntoIter = slice::Iter<'a, Instr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{instr}")?;
        }
        Ok(())
    }
}

/// ordered cycles, consumed front to back by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    cycles: Vec<Bundle>,
}

impl Schedule {
    pub(crate) fn push(&mut self, bundle: Bundle) {
        self.cycles.push(bundle)
    }
    pub fn cycles(&self) -> &[Bundle] {
        &self.cycles
    }
    pub fn num_cycles(&self) -> usize {
        self.cycles.len()
    }
    /// total instruction count across all cycles.
    pub fn num_instrs(&self) -> usize {
        self.cycles.iter().map(Bundle::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
    pub fn iter(&self) -> slice::Iter<'_, Bundle> {
        self.cycles.iter()
    }
}

impl IntoIterator for Schedule {
    type Item = Bundle;
    type IntoIter = std::vec::IntoIter<Bundle>;

    fn into_iter(self) -> Self::IntoIter {
        self.cycles.into_iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Bundle;
    type IntoIter = slice::Iter<'a, Bundle>;

    fn into_iter(self) -> Self::IntoIter {
        self.cycles.iter()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, bundle) in self.cycles.iter().enumerate() {
            writeln!(f, "cycle {}: {bundle}", i + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::Operand;

    #[test]
    fn test_display() {
        let mut s = Schedule::default();
        s.push(Bundle::from(vec![
            Instr::new("add", "a", vec![Operand::ident("b"), Operand::ident("c")]),
            Instr::new("mul", "x", vec![Operand::ident("y"), Operand::ident("z")]),
        ]));
        s.push(Bundle::from(vec![Instr::new(
            "mul",
            "r",
            vec![Operand::ident("a"), Operand::lit(5)],
        )]));
        assert_eq!(
            s.to_string(),
            "cycle 1: add a, b, c; mul x, y, z\ncycle 2: mul r, a, 5\n"
        );
        assert_eq!(s.num_cycles(), 2);
        assert_eq!(s.num_instrs(), 3);
    }

    #[test]
    fn test_empty_schedule_renders_nothing() {
        assert_eq!(Schedule::default().to_string(), "");
    }
}
