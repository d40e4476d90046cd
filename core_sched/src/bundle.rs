//! Compile-time bundling: a single forward pass groups instructions
//! into bundles, the way a VLIW compiler packs an instruction word.

use crate::{
    instr::Instr,
    ready::ReadySet,
    sched::{AvailabilityPolicy, Bundle, Schedule},
};

/// partitions `instrs` into maximal sequential bundles in one linear
/// scan.
///
/// a satisfied instruction joins the bundle open at that point; an
/// unsatisfied one closes it and opens a fresh bundle holding only
/// itself. the pass never looks back, so an instruction lands in
/// exactly the bundle open when its operands first test ready, and
/// order within a bundle is program order.
///
/// destinations produced inside a bundle are held back until that
/// bundle closes: readiness is always tested against the values
/// available before the bundle started, so an instruction never
/// consumes something produced earlier in its own bundle.
///
/// under [`AvailabilityPolicy::Permissive`] an unsatisfied
/// instruction's destination is held back and released like any other,
/// so this pass cannot stall: every input, satisfiable or not, is
/// scheduled. [`AvailabilityPolicy::Strict`] withholds such
/// destinations for good.
pub fn schedule_static(
    instrs: &[Instr],
    ready: &ReadySet,
    policy: AvailabilityPolicy,
) -> Schedule {
    let mut available = ready.clone();
    let mut pending: Vec<&str> = Vec::new();
    let mut schedule = Schedule::default();
    let mut current = Bundle::default();
    for instr in instrs {
        let satisfied = available.all_satisfied(instr);
        if !satisfied && !current.is_empty() {
            schedule.push(std::mem::take(&mut current));
            release(&mut available, &mut pending);
        }
        current.push(instr.clone());
        if satisfied || policy == AvailabilityPolicy::Permissive {
            pending.push(&instr.dest);
        }
    }
    if !current.is_empty() {
        schedule.push(current);
        release(&mut available, &mut pending);
    }
    schedule
}

fn release(available: &mut ReadySet, pending: &mut Vec<&str>) {
    for dest in pending.drain(..) {
        if !available.mark_produced(dest) {
            log::warn!("destination `{dest}` shadows an available value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::Operand;

    fn three_instr_program() -> Vec<Instr> {
        vec![
            Instr::new("add", "a", vec![Operand::ident("b"), Operand::ident("c")]),
            Instr::new("mul", "x", vec![Operand::ident("y"), Operand::ident("z")]),
            Instr::new("mul", "r", vec![Operand::ident("a"), Operand::lit(5)]),
        ]
    }

    fn base_ready() -> ReadySet {
        ["b", "c", "y", "z"].into_iter().collect()
    }

    #[test]
    fn test_worked_example() {
        let instrs = three_instr_program();
        let s = schedule_static(&instrs, &base_ready(), Default::default());
        assert_eq!(s.num_cycles(), 2);
        assert_eq!(s.cycles()[0].as_slice(), &instrs[..2]);
        assert_eq!(s.cycles()[1].as_slice(), &instrs[2..]);
    }

    #[test]
    fn test_empty_program() {
        let s = schedule_static(&[], &base_ready(), Default::default());
        assert!(s.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let instrs = three_instr_program();
        let a = schedule_static(&instrs, &base_ready(), Default::default());
        let b = schedule_static(&instrs, &base_ready(), Default::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_coverage() {
        let instrs = three_instr_program();
        let s = schedule_static(&instrs, &base_ready(), Default::default());
        let flat: Vec<_> = s.into_iter().flat_map(Bundle::into_inner).collect();
        assert_eq!(flat, instrs);
    }

    #[test]
    fn test_dest_available_only_after_bundle_closes() {
        // the producer of `a` shares a bundle with nothing; its
        // consumer must still wait for the close, never joining the
        // producer's own bundle.
        let instrs = vec![
            Instr::new("add", "a", vec![Operand::ident("b")]),
            Instr::new("add", "c", vec![Operand::ident("a")]),
        ];
        let ready: ReadySet = ["b"].into_iter().collect();
        let s = schedule_static(&instrs, &ready, Default::default());
        assert_eq!(s.num_cycles(), 2);
        assert_eq!(s.cycles()[0].as_slice(), &instrs[..1]);
        assert_eq!(s.cycles()[1].as_slice(), &instrs[1..]);
    }

    #[test]
    fn test_unsatisfiable_still_scheduled() {
        // `w` never exists, yet the pass must not stall. under the
        // permissive policy `q` is released when its bundle closes, so
        // the follow-up lands in the next bundle rather than nowhere.
        let instrs = vec![
            Instr::new("add", "q", vec![Operand::ident("w")]),
            Instr::new("add", "s", vec![Operand::ident("q")]),
        ];
        let s = schedule_static(&instrs, &ReadySet::new(), AvailabilityPolicy::Permissive);
        assert_eq!(s.num_cycles(), 2);
        assert_eq!(s.num_instrs(), 2);
    }

    #[test]
    fn test_strict_withholds_unsatisfied_dest() {
        // `q` is never satisfied. permissive releases it at the close
        // of bundle 1, so its consumer joins the bundle open at that
        // point; strict withholds it for good and the consumer opens a
        // third bundle.
        let instrs = vec![
            Instr::new("add", "q", vec![Operand::ident("w")]),
            Instr::new("add", "t", vec![Operand::ident("w2")]),
            Instr::new("add", "u", vec![Operand::ident("q")]),
        ];
        let s = schedule_static(&instrs, &ReadySet::new(), AvailabilityPolicy::Permissive);
        assert_eq!(s.num_cycles(), 2);
        assert_eq!(s.cycles()[1].as_slice(), &instrs[1..]);
        let s = schedule_static(&instrs, &ReadySet::new(), AvailabilityPolicy::Strict);
        assert_eq!(s.num_cycles(), 3);
        assert!(s.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn test_no_lookback_on_permuted_input() {
        // with the consumer listed first, the forward-only pass packs
        // all three into the bundle open at that point.
        let instrs = three_instr_program();
        let permuted = vec![instrs[2].clone(), instrs[0].clone(), instrs[1].clone()];
        let s = schedule_static(&permuted, &base_ready(), Default::default());
        assert_eq!(s.num_cycles(), 1);
        assert_eq!(s.cycles()[0].as_slice(), permuted.as_slice());
    }
}
