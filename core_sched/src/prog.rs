//! Program encodings: a line-oriented text format and a JSON form.
//!
//! text format, one instruction per line, `#` starts a comment:
//!
//! ```text
//! ready b c y z
//! add a b c
//! mul x y z
//! mul r a 5
//! ```
//!
//! integer tokens are literals, everything else an identifier. a
//! `ready` line declares initially available identifiers; literal
//! tokens there are accepted and dropped, since literals are always
//! available anyway.

use anyhow::Result;
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{space0, space1},
    combinator::all_consuming,
    multi::many0,
    sequence::{preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    instr::{Instr, Operand},
    ready::ReadySet,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: not an instruction: `{text}`")]
    BadLine { line: usize, text: String },
}

/// an instruction list plus the identifiers available before cycle 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub ready: Vec<String>,
    pub instrs: Vec<Instr>,
}

impl Program {
    pub fn ready_set(&self) -> ReadySet {
        self.ready.iter().map(String::as_str).collect()
    }

    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_text(src: &str) -> Result<Self> {
        let mut prog = Program::default();
        for (index, raw) in src.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let parsed = all_consuming(terminated(
                alt((ready_line, instr_line)),
                space0,
            ))(line);
            match parsed {
                Ok((_, Line::Ready(ids))) => prog.ready.extend(ids),
                Ok((_, Line::Instr(instr))) => prog.instrs.push(instr),
                Err(_) => {
                    return Err(ParseError::BadLine {
                        line: index + 1,
                        text: line.to_owned(),
                    }
                    .into())
                }
            }
        }
        Ok(prog)
    }
}

enum Line {
    Ready(Vec<String>),
    Instr(Instr),
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)
}

fn operand(input: &str) -> IResult<&str, Operand> {
    let (rest, tok) =
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.' || c == '-')(input)?;
    // a token that parses whole as an integer is a literal; "5x" and
    // the like stay identifiers
    let oprnd = match tok.parse::<i64>() {
        Ok(v) => Operand::Lit(v),
        Err(_) => Operand::Ident(tok.to_owned()),
    };
    Ok((rest, oprnd))
}

fn ready_line(input: &str) -> IResult<&str, Line> {
    let (input, kw) = ident(input)?;
    if kw != "ready" {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (input, operands) = many0(preceded(space1, operand))(input)?;
    let mut ids = Vec::new();
    for oprnd in operands {
        match oprnd {
            Operand::Ident(id) => ids.push(id),
            Operand::Lit(v) => log::debug!("ignoring literal {v} in ready line"),
        }
    }
    Ok((input, Line::Ready(ids)))
}

fn instr_line(input: &str) -> IResult<&str, Line> {
    let (input, op) = ident(input)?;
    let (input, _) = space1(input)?;
    let (input, dest) = ident(input)?;
    let (input, operands) = many0(preceded(space1, operand))(input)?;
    Ok((input, Line::Instr(Instr::new(op, dest, operands))))
}
