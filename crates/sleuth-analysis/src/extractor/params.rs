//! Parameter recovery from `CREATE PROCEDURE`/`CREATE FUNCTION` headers.
//!
//! Connectors usually supply parameters directly; this is the fallback for
//! snapshots that only carry the body text.

use sleuth_core::catalog::{ParamDirection, RoutineParameter};

use super::lexer::{tokenize, Tok};

/// Extract declared parameters from a routine body's CREATE header.
/// Returns an empty list when no header is recognizable.
pub fn extract_parameters(body: &str) -> Vec<RoutineParameter> {
    let toks = tokenize(body);
    let mut i = 0;
    while i < toks.len() {
        if toks[i].is_kw("create") || toks[i].is_kw("alter") {
            let mut j = i + 1;
            if toks.get(j).is_some_and(|t| t.is_kw("or"))
                && toks.get(j + 1).is_some_and(|t| t.is_kw("alter"))
            {
                j += 2;
            }
            let is_routine = toks.get(j).is_some_and(|t| {
                t.is_kw("proc") || t.is_kw("procedure") || t.is_kw("function")
            });
            if is_routine {
                j += 1;
                // Skip the dotted routine name.
                while matches!(toks.get(j), Some(Tok::Word(_) | Tok::Quoted(_)))
                    || matches!(toks.get(j), Some(Tok::Sym('.')))
                {
                    j += 1;
                }
                return parse_params(&toks, j);
            }
        }
        i += 1;
    }
    Vec::new()
}

fn parse_params(toks: &[Tok], mut i: usize) -> Vec<RoutineParameter> {
    if matches!(toks.get(i), Some(Tok::Sym('('))) {
        i += 1;
    }

    let mut params = Vec::new();
    let mut chunk: Vec<&Tok> = Vec::new();
    let mut depth = 0usize;

    loop {
        match toks.get(i) {
            None => break,
            Some(Tok::Sym('(')) => {
                depth += 1;
                chunk.push(&toks[i]);
            }
            Some(Tok::Sym(')')) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                chunk.push(&toks[i]);
            }
            Some(Tok::Sym(',')) if depth == 0 => {
                if let Some(param) = build_param(&chunk) {
                    params.push(param);
                }
                chunk.clear();
            }
            Some(Tok::Word(w))
                if depth == 0
                    && (w.eq_ignore_ascii_case("as")
                        || w.eq_ignore_ascii_case("returns")
                        || w.eq_ignore_ascii_case("begin")) =>
            {
                break;
            }
            Some(tok) => chunk.push(tok),
        }
        i += 1;
    }
    if let Some(param) = build_param(&chunk) {
        params.push(param);
    }
    params
}

fn build_param(chunk: &[&Tok]) -> Option<RoutineParameter> {
    let var_pos = chunk.iter().position(|t| matches!(t, Tok::Var(_)))?;
    let name = match chunk[var_pos] {
        Tok::Var(name) => name.clone(),
        _ => unreachable!(),
    };

    let mut declared_type = String::new();
    let mut direction = ParamDirection::In;
    for tok in &chunk[var_pos + 1..] {
        match tok {
            Tok::Sym('=') => break,
            Tok::Word(w)
                if w.eq_ignore_ascii_case("output") || w.eq_ignore_ascii_case("out") =>
            {
                direction = ParamDirection::Out;
            }
            Tok::Word(w) if w.eq_ignore_ascii_case("readonly") => {}
            Tok::Word(w) => {
                if declared_type
                    .chars()
                    .last()
                    .is_some_and(|c| c.is_alphanumeric())
                {
                    declared_type.push(' ');
                }
                declared_type.push_str(w);
            }
            Tok::Num(n) => declared_type.push_str(n),
            Tok::Sym(c @ ('(' | ')' | ',')) => declared_type.push(*c),
            _ => {}
        }
    }

    if declared_type.is_empty() {
        return None;
    }
    Some(RoutineParameter {
        name,
        declared_type,
        direction,
    })
}
