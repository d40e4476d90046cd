pub mod bundle;
pub mod exec;
pub mod instr;
pub mod issue;
pub mod prog;
pub mod ready;
pub mod sched;

#[cfg(feature = "stat")]
pub mod stat;
