use std::{collections::HashSet, fmt};

use crate::instr::{Instr, Operand};

/// tracks which identifiers are available. grows monotonically: there
/// is no way to remove a value once it has been produced.
#[derive(Debug, Clone, Default)]
pub struct ReadySet {
    idents: HashSet<String>,
}

impl ReadySet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn contains_ident(&self, id: &str) -> bool {
        self.idents.contains(id)
    }

    /// literals are always satisfied; identifiers must have been
    /// produced or supplied up front.
    pub fn is_satisfied(&self, oprnd: &Operand) -> bool {
        match oprnd {
            Operand::Lit(_) => true,
            Operand::Ident(id) => self.idents.contains(id),
        }
    }

    pub fn all_satisfied(&self, instr: &Instr) -> bool {
        instr.operands.iter().all(|o| self.is_satisfied(o))
    }

    /// marks `dest` as available. returns `false` when the value was
    /// already present, i.e. the destination shadows an earlier one.
    pub fn mark_produced(&mut self, dest: &str) -> bool {
        self.idents.insert(dest.to_owned())
    }

    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }
}

impl FromIterator<String> for ReadySet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            idents: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for ReadySet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        iter.into_iter().map(str::to_owned).collect()
    }
}

impl fmt::Display for ReadySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // sorted so the rendering is stable
        let mut ids: Vec<_> = self.idents.iter().collect();
        ids.sort();
        write!(f, "{{")?;
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals_always_satisfied() {
        let r = ReadySet::new();
        assert!(r.is_satisfied(&Operand::lit(5)));
        assert!(!r.is_satisfied(&Operand::ident("5")));
    }

    #[test]
    fn test_mark_produced_reports_shadowing() {
        let mut r: ReadySet = ["b"].into_iter().collect();
        assert!(r.mark_produced("a"));
        assert!(!r.mark_produced("a"));
        assert!(!r.mark_produced("b"));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_all_satisfied() {
        let r: ReadySet = ["b", "c"].into_iter().collect();
        let i = Instr::new("add", "a", vec![Operand::ident("b"), Operand::ident("c")]);
        assert!(r.all_satisfied(&i));
        let j = Instr::new("mul", "r", vec![Operand::ident("a"), Operand::lit(5)]);
        assert!(!r.all_satisfied(&j));
    }

    #[test]
    fn test_display_sorted() {
        let r: ReadySet = ["z", "b", "y"].into_iter().collect();
        assert_eq!(r.to_string(), "{b, y, z}");
    }
}
