use std::{fmt, time};

use crate::sched::Schedule;

pub trait Stat {
    fn view(&self, max_width: usize) -> Box<dyn StatView + '_>;
}

pub trait StatView: fmt::Display {
    /// header of stat
    fn header(&self) -> &'static str;
    /// body width
    fn width(&self) -> usize;
}

#[derive(Default)]
pub struct Stats {
    stats: Vec<Box<dyn Stat>>,
}

impl Stats {
    pub fn push(&mut self, stat: Box<dyn Stat>) {
        self.stats.push(stat)
    }
    pub fn view(&self, max_width: usize) -> StatAllView<'_> {
        StatAllView {
            views: self.stats.iter().map(|s| s.view(max_width)).collect(),
        }
    }
}

pub struct StatAllView<'s> {
    views: Vec<Box<dyn StatView + 's>>,
}

impl fmt::Display for StatAllView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .views
            .iter()
            .map(|s| s.header().len().max(s.width()))
            .max()
            .unwrap_or(20);
        writeln!(f, "{:-^width$}", " statistics ")?;
        for sv in &self.views {
            writeln!(f, "{}:", sv.header())?;
            writeln!(f, "{}", sv)?;
        }
        write!(f, "{:-<width$}", "")
    }
}

pub struct SchedStatBuilder {
    begin: time::Instant,
    instrs: Option<usize>,
    cycles: Option<usize>,
    widest: Option<usize>,
    elapsed: Option<time::Duration>,
}

impl SchedStatBuilder {
    pub fn new() -> Self {
        Self {
            begin: time::Instant::now(),
            instrs: None,
            cycles: None,
            widest: None,
            elapsed: None,
        }
    }
    pub fn record(&mut self, schedule: &Schedule) {
        self.instrs = Some(schedule.num_instrs());
        self.cycles = Some(schedule.num_cycles());
        self.widest = Some(schedule.iter().map(|b| b.len()).max().unwrap_or(0));
    }
    pub fn stop_timer(&mut self) {
        self.elapsed = Some(time::Instant::now() - self.begin)
    }
    pub fn finish(&self) -> SchedStat {
        SchedStat {
            instrs: self.instrs.unwrap(),
            cycles: self.cycles.unwrap(),
            widest: self.widest.unwrap(),
            elapsed: self.elapsed.unwrap(),
        }
    }
}

impl Default for SchedStatBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SchedStat {
    instrs: usize,
    cycles: usize,
    widest: usize,
    elapsed: time::Duration,
}

impl Stat for SchedStat {
    fn view(&self, _: usize) -> Box<dyn StatView + '_> {
        Box::new(self)
    }
}

impl StatView for &'_ SchedStat {
    fn header(&self) -> &'static str {
        "scheduler stat"
    }
    fn width(&self) -> usize {
        30
    }
}

impl fmt::Display for &'_ SchedStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instrs = format!("#{}", self.instrs);
        writeln!(f, "  instrs total: {instrs:>12}")?;
        let cycles = format!("#{}", self.cycles);
        writeln!(f, "  cycles total: {cycles:>12}")?;
        let widest = format!("#{}", self.widest);
        writeln!(f, "  widest bundle: {widest:>11}")?;
        let mean = self.instrs as f64 / self.cycles.max(1) as f64;
        let mean = format!("{mean:.2}");
        writeln!(f, "  mean width: {mean:>14}")?;
        let us = format!("{} us", self.elapsed.as_micros());
        writeln!(f, "  elapsed: {us:>17}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bundle::schedule_static,
        instr::{Instr, Operand},
        ready::ReadySet,
    };

    #[test]
    fn test_record_counts() {
        let instrs = vec![
            Instr::new("add", "a", vec![Operand::ident("b"), Operand::ident("c")]),
            Instr::new("mul", "x", vec![Operand::ident("y"), Operand::ident("z")]),
            Instr::new("mul", "r", vec![Operand::ident("a"), Operand::lit(5)]),
        ];
        let ready: ReadySet = ["b", "c", "y", "z"].into_iter().collect();
        let mut b = SchedStatBuilder::new();
        let s = schedule_static(&instrs, &ready, Default::default());
        b.record(&s);
        b.stop_timer();
        let stat = b.finish();
        assert_eq!(stat.instrs, 3);
        assert_eq!(stat.cycles, 2);
        assert_eq!(stat.widest, 2);
    }
}
