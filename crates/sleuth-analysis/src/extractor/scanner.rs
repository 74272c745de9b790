//! Clause-position state machine over the token stream.

use sleuth_core::catalog::Fqn;
use sleuth_core::errors::AnalysisWarning;
use sleuth_core::types::collections::{FxHashMap, FxHashSet};

use super::lexer::{tokenize, Tok};
use super::resolve::{NameResolver, Resolution};
use super::types::{AntiPattern, CrudFlags, ExtractionResult};

/// Words that can never be a table alias.
const KEYWORDS: &[&str] = &[
    "select", "from", "where", "insert", "into", "update", "delete", "join", "inner", "outer",
    "left", "right", "full", "cross", "on", "and", "or", "not", "in", "exists", "between", "like",
    "is", "null", "set", "values", "as", "begin", "end", "if", "else", "while", "return",
    "declare", "exec", "execute", "call", "create", "alter", "drop", "table", "procedure",
    "function", "view", "index", "trigger", "group", "order", "by", "having", "union", "all",
    "distinct", "top", "limit", "offset", "fetch", "next", "rows", "only", "case", "when", "then",
    "cast", "convert", "coalesce", "with", "nolock", "merge", "using", "output", "option",
    "pivot", "unpivot", "apply", "tablesample", "matched", "returns", "go",
];

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k))
}

/// What a captured table position means for CRUD attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableRole {
    From,
    Join,
    Update,
    InsertInto,
    DeleteFrom,
    MergeInto,
}

impl TableRole {
    fn crud(&self) -> CrudFlags {
        let mut flags = CrudFlags::default();
        match self {
            Self::From | Self::Join => flags.read = true,
            Self::Update | Self::MergeInto => flags.update = true,
            Self::InsertInto => flags.create = true,
            Self::DeleteFrom => flags.delete = true,
        }
        flags
    }
}

/// Extract every reference a body yields.
///
/// `object_name` is only used to attribute warnings. Never fails:
/// malformed segments contribute nothing.
pub fn extract(object_name: &str, body: &str, resolver: &NameResolver) -> ExtractionResult {
    let toks = tokenize(body);
    let mut scanner = Scanner {
        toks: &toks,
        resolver,
        object_name,
        result: ExtractionResult::default(),
        aliases: FxHashMap::default(),
        ctes: FxHashSet::default(),
        pending: Vec::new(),
        exec_concat: false,
        has_sp_executesql: false,
    };
    scanner.collect_ctes();
    scanner.run();
    scanner.finish()
}

struct Scanner<'a> {
    toks: &'a [Tok],
    resolver: &'a NameResolver,
    object_name: &'a str,
    result: ExtractionResult,
    /// lowercased alias or bare table name -> resolved table
    aliases: FxHashMap<String, Fqn>,
    /// lowercased CTE names, excluded from table positions
    ctes: FxHashSet<String>,
    /// UPDATE/DELETE targets that looked like aliases; re-resolved at the
    /// end once the full alias map exists
    pending: Vec<(String, TableRole)>,
    exec_concat: bool,
    has_sp_executesql: bool,
}

impl<'a> Scanner<'a> {
    /// Pre-pass: collect CTE names from `WITH name AS (...)` chains so the
    /// main scan can exclude them. Bodies are still scanned normally.
    fn collect_ctes(&mut self) {
        let mut i = 0;
        while i < self.toks.len() {
            if self.toks[i].is_kw("with")
                && !matches!(self.toks.get(i + 1), Some(Tok::Sym('(')))
            {
                let mut j = i + 1;
                loop {
                    let Some(name) = self.toks.get(j).and_then(Tok::ident) else {
                        break;
                    };
                    let name = name.to_ascii_lowercase();
                    let mut k = j + 1;
                    if matches!(self.toks.get(k), Some(Tok::Sym('('))) {
                        k = self.skip_parens(k);
                    }
                    if !self.toks.get(k).is_some_and(|t| t.is_kw("as")) {
                        break;
                    }
                    k += 1;
                    if !matches!(self.toks.get(k), Some(Tok::Sym('('))) {
                        break;
                    }
                    self.ctes.insert(name);
                    k = self.skip_parens(k);
                    if matches!(self.toks.get(k), Some(Tok::Sym(','))) {
                        j = k + 1;
                    } else {
                        break;
                    }
                }
            }
            i += 1;
        }
    }

    /// Index just past the paren group opening at `open`.
    fn skip_parens(&self, open: usize) -> usize {
        debug_assert!(matches!(self.toks.get(open), Some(Tok::Sym('('))));
        let mut depth = 0usize;
        let mut i = open;
        while i < self.toks.len() {
            match self.toks[i] {
                Tok::Sym('(') => depth += 1,
                Tok::Sym(')') => {
                    depth -= 1;
                    if depth == 0 {
                        return i + 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        i
    }

    fn run(&mut self) {
        let mut i = 0;
        while i < self.toks.len() {
            match &self.toks[i] {
                Tok::Word(word) => {
                    let lower = word.to_ascii_lowercase();
                    match lower.as_str() {
                        "from" => {
                            i = self.capture_tables(i + 1, TableRole::From);
                            continue;
                        }
                        "join" => {
                            i = self.capture_tables(i + 1, TableRole::Join);
                            continue;
                        }
                        "using" => {
                            i = self.capture_tables(i + 1, TableRole::From);
                            continue;
                        }
                        "update" => {
                            i = self.capture_tables(i + 1, TableRole::Update);
                            continue;
                        }
                        "insert" => {
                            let next = i + 1;
                            let start = if self.toks.get(next).is_some_and(|t| t.is_kw("into")) {
                                next + 1
                            } else {
                                next
                            };
                            i = self.capture_tables(start, TableRole::InsertInto);
                            continue;
                        }
                        "delete" => {
                            let next = i + 1;
                            let start = if self.toks.get(next).is_some_and(|t| t.is_kw("from")) {
                                next + 1
                            } else {
                                next
                            };
                            i = self.capture_tables(start, TableRole::DeleteFrom);
                            continue;
                        }
                        "merge" => {
                            let next = i + 1;
                            let start = if self.toks.get(next).is_some_and(|t| t.is_kw("into")) {
                                next + 1
                            } else {
                                next
                            };
                            i = self.capture_tables(start, TableRole::MergeInto);
                            continue;
                        }
                        "exec" | "execute" => {
                            i = self.handle_exec(i + 1);
                            continue;
                        }
                        "call" => {
                            i = self.capture_routine(i + 1);
                            continue;
                        }
                        "select" => {
                            if matches!(self.toks.get(i + 1), Some(Tok::Sym('*'))) {
                                self.result.anti_patterns.insert(AntiPattern::SelectStar);
                            }
                        }
                        "on" => {
                            i = self.scan_on_clause(i + 1);
                            continue;
                        }
                        "declare" => {
                            let is_name = matches!(
                                self.toks.get(i + 1),
                                Some(Tok::Word(_) | Tok::Quoted(_) | Tok::Var(_))
                            );
                            if is_name
                                && self.toks.get(i + 2).is_some_and(|t| t.is_kw("cursor"))
                            {
                                self.result.anti_patterns.insert(AntiPattern::Cursor);
                            }
                        }
                        "nolock" => {
                            self.result.anti_patterns.insert(AntiPattern::Nolock);
                        }
                        "sp_executesql" => {
                            self.result.anti_patterns.insert(AntiPattern::DynamicSql);
                            self.has_sp_executesql = true;
                        }
                        _ => {}
                    }
                }
                Tok::Temp(name) if name.starts_with("##") => {
                    self.result.anti_patterns.insert(AntiPattern::GlobalTempTable);
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// Capture one table (or a comma-separated FROM list) at a table
    /// position. Returns the next index to scan from.
    fn capture_tables(&mut self, start: usize, role: TableRole) -> usize {
        let mut i = start;
        loop {
            match self.toks.get(i) {
                // Temp tables and table variables never count as references.
                Some(Tok::Temp(_) | Tok::Var(_)) => {
                    i = self.take_alias(i + 1).0;
                }
                // Derived table: let the main loop scan inside the parens.
                Some(Tok::Sym('(')) => return i,
                Some(tok) if tok.ident().is_some() => {
                    let (parts, after) = self.read_name_parts(i);
                    i = self.capture_named(parts, after, role);
                }
                _ => return i,
            }
            if role == TableRole::From && matches!(self.toks.get(i), Some(Tok::Sym(','))) {
                i += 1;
                continue;
            }
            return i;
        }
    }

    /// Read a dotted name chain starting at `i`. Returns the parts and the
    /// index just past them.
    fn read_name_parts(&self, i: usize) -> (Vec<String>, usize) {
        let mut parts = Vec::new();
        let mut j = i;
        loop {
            match self.toks.get(j).and_then(Tok::ident) {
                Some(ident) => parts.push(ident.to_string()),
                None => break,
            }
            if matches!(self.toks.get(j + 1), Some(Tok::Sym('.')))
                && self.toks.get(j + 2).and_then(Tok::ident).is_some()
            {
                j += 2;
            } else {
                j += 1;
                break;
            }
        }
        (parts, j)
    }

    fn capture_named(&mut self, parts: Vec<String>, after: usize, role: TableRole) -> usize {
        // Three-part names keep the trailing (schema, name) pair.
        let (schema, name) = match parts.len() {
            0 => return after,
            1 => (None, parts[0].clone()),
            n => (Some(parts[n - 2].clone()), parts[n - 1].clone()),
        };

        if schema.is_none() && self.ctes.contains(&name.to_ascii_lowercase()) {
            return self.take_alias(after).0;
        }

        match self.resolver.resolve_relation(schema.as_deref(), &name) {
            Resolution::Resolved(fqn, _) => {
                self.result.referenced.insert(fqn.clone());
                self.result
                    .crud
                    .entry(fqn.clone())
                    .or_default()
                    .merge(role.crud());
                self.aliases.insert(name.to_ascii_lowercase(), fqn.clone());
                let (next, alias) = self.take_alias(after);
                if let Some(alias) = alias {
                    self.aliases.insert(alias.to_ascii_lowercase(), fqn);
                }
                next
            }
            Resolution::Ambiguous(candidates) => {
                self.result.warnings.push(AnalysisWarning::AmbiguousReference {
                    object: self.object_name.to_string(),
                    identifier: name,
                    candidates: candidates.iter().map(|f| f.to_string()).collect(),
                });
                self.take_alias(after).0
            }
            Resolution::Unknown => {
                // An UPDATE/DELETE target may be an alias defined by a later
                // FROM clause; re-resolve once the alias map is complete.
                if schema.is_none()
                    && matches!(role, TableRole::Update | TableRole::DeleteFrom)
                {
                    self.pending.push((name.to_ascii_lowercase(), role));
                }
                self.take_alias(after).0
            }
        }
    }

    /// Consume an optional `AS alias` or bare alias. Returns the next index
    /// and the alias, if one was present.
    fn take_alias(&self, i: usize) -> (usize, Option<String>) {
        if self.toks.get(i).is_some_and(|t| t.is_kw("as")) {
            if let Some(alias) = self.toks.get(i + 1).and_then(Tok::ident) {
                return (i + 2, Some(alias.to_string()));
            }
            return (i + 1, None);
        }
        match self.toks.get(i) {
            Some(Tok::Quoted(alias)) => (i + 1, Some(alias.clone())),
            Some(Tok::Word(word)) if !is_keyword(word) => (i + 1, Some(word.clone())),
            _ => (i, None),
        }
    }

    fn handle_exec(&mut self, i: usize) -> usize {
        match self.toks.get(i) {
            Some(Tok::Sym('(')) => {
                self.result.anti_patterns.insert(AntiPattern::DynamicSql);
                let end = self.skip_parens(i);
                if self.toks[i..end].contains(&Tok::Sym('+')) {
                    self.exec_concat = true;
                }
                // Re-scan the argument tokens in the main loop; they are
                // expressions, which the scanner treats as inert.
                i
            }
            Some(Tok::Var(_)) => {
                self.result.anti_patterns.insert(AntiPattern::DynamicSql);
                i + 1
            }
            Some(tok) if tok.is_kw("sp_executesql") => {
                self.result.anti_patterns.insert(AntiPattern::DynamicSql);
                self.has_sp_executesql = true;
                i + 1
            }
            Some(tok) if tok.ident().is_some() => self.capture_routine(i),
            _ => i,
        }
    }

    fn capture_routine(&mut self, i: usize) -> usize {
        let (parts, after) = self.read_name_parts(i);
        let (schema, name) = match parts.len() {
            0 => return after,
            1 => (None, parts[0].clone()),
            n => (Some(parts[n - 2].clone()), parts[n - 1].clone()),
        };
        match self.resolver.resolve_routine(schema.as_deref(), &name) {
            Resolution::Resolved(fqn, _) => {
                self.result.called_routines.insert(fqn);
            }
            Resolution::Ambiguous(candidates) => {
                self.result.warnings.push(AnalysisWarning::AmbiguousReference {
                    object: self.object_name.to_string(),
                    identifier: name,
                    candidates: candidates.iter().map(|f| f.to_string()).collect(),
                });
            }
            Resolution::Unknown => {}
        }
        after
    }

    /// Scan a JOIN's ON predicate for `alias1.col1 = alias2.col2`
    /// equalities. Non-equality predicates are ignored. Returns the index
    /// of the terminator token, which the main loop reprocesses.
    fn scan_on_clause(&mut self, start: usize) -> usize {
        const TERMINATORS: &[&str] = &[
            "where", "group", "order", "having", "union", "inner", "left", "right", "full",
            "cross", "join", "on", "select", "insert", "update", "delete", "merge", "when",
            "option", "return", "end", "begin",
        ];
        let mut depth = 0usize;
        let mut i = start;
        while let Some(tok) = self.toks.get(i) {
            match tok {
                Tok::Sym('(') => depth += 1,
                Tok::Sym(')') => {
                    if depth == 0 {
                        return i;
                    }
                    depth -= 1;
                }
                Tok::Sym(';') => return i,
                Tok::Word(word) if depth == 0 && is_terminator(word, TERMINATORS) => {
                    return i;
                }
                _ => {}
            }

            if let Some((left, right)) = self.match_equality(i) {
                let t1 = self.lookup_alias(&left.0);
                let t2 = self.lookup_alias(&right.0);
                if let (Some(t1), Some(t2)) = (t1, t2) {
                    if t1 != t2 {
                        let pair = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
                        self.result.joins.insert(pair);
                    }
                }
                i += 7;
                continue;
            }
            i += 1;
        }
        i
    }

    /// Match `ident.ident = ident.ident` at `i`, returning
    /// ((alias1, col1), (alias2, col2)).
    #[allow(clippy::type_complexity)]
    fn match_equality(&self, i: usize) -> Option<((String, String), (String, String))> {
        let a = self.toks.get(i)?.ident()?;
        if !matches!(self.toks.get(i + 1), Some(Tok::Sym('.'))) {
            return None;
        }
        let ac = self.toks.get(i + 2)?.ident()?;
        if !matches!(self.toks.get(i + 3), Some(Tok::Sym('='))) {
            return None;
        }
        let b = self.toks.get(i + 4)?.ident()?;
        if !matches!(self.toks.get(i + 5), Some(Tok::Sym('.'))) {
            return None;
        }
        let bc = self.toks.get(i + 6)?.ident()?;
        Some((
            (a.to_string(), ac.to_string()),
            (b.to_string(), bc.to_string()),
        ))
    }

    fn lookup_alias(&self, name: &str) -> Option<Fqn> {
        if let Some(fqn) = self.aliases.get(&name.to_ascii_lowercase()) {
            return Some(fqn.clone());
        }
        match self.resolver.resolve_relation(None, name) {
            Resolution::Resolved(fqn, _) => Some(fqn),
            _ => None,
        }
    }

    fn finish(mut self) -> ExtractionResult {
        // UPDATE/DELETE targets that were aliases for a later FROM clause.
        for (name, role) in std::mem::take(&mut self.pending) {
            if let Some(fqn) = self.aliases.get(&name).cloned() {
                self.result.referenced.insert(fqn.clone());
                self.result.crud.entry(fqn).or_default().merge(role.crud());
            }
        }

        if self.exec_concat && !self.has_sp_executesql {
            self.result.anti_patterns.insert(AntiPattern::DynamicConcat);
        }

        self.collect_column_refs();
        self.result
    }

    /// Post-pass: attribute `alias.column` references now that the alias
    /// map is complete, and collect every bare identifier for the
    /// unqualified-usage check.
    fn collect_column_refs(&mut self) {
        for i in 0..self.toks.len() {
            if let Some(ident) = self.toks[i].ident() {
                self.result
                    .loose_idents
                    .insert(ident.to_ascii_lowercase());

                if matches!(self.toks.get(i + 1), Some(Tok::Sym('.'))) {
                    if let Some(column) = self.toks.get(i + 2).and_then(Tok::ident) {
                        // A further dot means this pair is schema.table.
                        if matches!(self.toks.get(i + 3), Some(Tok::Sym('.'))) {
                            continue;
                        }
                        if let Some(fqn) = self.aliases.get(&ident.to_ascii_lowercase()) {
                            self.result
                                .column_refs
                                .entry(fqn.clone())
                                .or_default()
                                .insert(column.to_ascii_lowercase());
                        }
                    }
                }
            }
        }
    }
}

fn is_terminator(word: &str, terminators: &[&str]) -> bool {
    terminators.iter().any(|t| word.eq_ignore_ascii_case(t))
}
