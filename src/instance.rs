//! Immutable QAP problem data: flows matrix A, distance matrix B, and the
//! header metadata (known optimum / lower bound / best-known solution).

use crate::error::QapError;
use std::path::Path;

/// Immutable problem instance. `a` and `b` are never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Instance {
    pub n: usize,
    pub a: Vec<Vec<i64>>,
    pub b: Vec<Vec<i64>>,
    /// Known optimum, 0 if unknown.
    pub opt: i64,
    /// Known lower bound, 0 if unknown.
    pub bound: i64,
    /// Best known solution cost, 0 if unknown.
    pub bks: i64,
    pub file_name: String,
}

impl Instance {
    /// Parses an instance file:
    ///
    /// - first line: `n [meta]` where meta is 0, 1, or 2 integers;
    /// - two values `(v1, v2)`: `v1 > 0` means `opt = v1`, `v1 <= 0` means
    ///   `bound = -v1`; `v2` is always `bks`;
    /// - one value: it is `bks`;
    /// - then `n*n` integers for A, then `n*n` for B, whitespace-separated,
    ///   blank lines allowed between and within the matrices.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let file_name = path.to_string_lossy().into_owned();
        Self::parse(&text, &file_name)
    }

    pub fn parse(text: &str, file_name: &str) -> Result<Self, QapError> {
        let err = |reason: String| QapError::Parse {
            file: file_name.to_string(),
            reason,
        };

        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| err("empty file, expected header line".into()))?;
        let mut header_tokens = header.split_whitespace();
        let n: usize = header_tokens
            .next()
            .ok_or_else(|| err("missing problem size n".into()))?
            .parse()
            .map_err(|_| err("problem size n is not an integer".into()))?;

        let meta: Vec<i64> = header_tokens
            .map(|t| {
                t.parse::<i64>()
                    .map_err(|_| err(format!("header value {t:?} is not an integer")))
            })
            .collect::<Result<_, _>>()?;

        let (opt, bound, bks) = match meta.as_slice() {
            [] => (0, 0, 0),
            [bks] => (0, 0, *bks),
            [v1, v2] => {
                if *v1 > 0 {
                    (*v1, *v1, *v2)
                } else {
                    (0, -*v1, *v2)
                }
            }
            _ => return Err(err("header has more than two meta values".into())),
        };

        // The rest of the file (everything after the header line) is a flat
        // whitespace-separated stream of n*n + n*n integers.
        let rest = match text.find('\n') {
            Some(idx) => &text[idx + 1..],
            None => "",
        };
        let mut tokens = rest.split_whitespace();
        let mut read_matrix = |name: &str| -> Result<Vec<Vec<i64>>, QapError> {
            let mut m = vec![vec![0i64; n]; n];
            for i in 0..n {
                for j in 0..n {
                    let t = tokens.next().ok_or_else(|| {
                        err(format!("matrix {name} is missing entry [{i}][{j}]"))
                    })?;
                    m[i][j] = t
                        .parse()
                        .map_err(|_| err(format!("matrix {name}[{i}][{j}] = {t:?} is not an integer")))?;
                }
            }
            Ok(m)
        };
        let a = read_matrix("A")?;
        let b = read_matrix("B")?;

        Ok(Instance {
            n,
            a,
            b,
            opt,
            bound,
            bks,
            file_name: file_name.to_string(),
        })
    }

    /// Writes the instance back out in the canonical whitespace format
    /// (grounded in `qap-new-format.c`'s re-emission of a loaded instance).
    pub fn emit(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        let v1 = if self.opt > 0 { self.opt } else { -self.bound };
        if self.bks > 0 {
            writeln!(out, "{} {} {}", self.n, v1, self.bks).unwrap();
        } else if v1 != 0 {
            writeln!(out, "{} {}", self.n, v1).unwrap();
        } else {
            writeln!(out, "{}", self.n).unwrap();
        }
        out.push('\n');
        for mat in [&self.a, &self.b] {
            for row in mat {
                let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
                writeln!(out, "{}", line.join(" ")).unwrap();
            }
            out.push('\n');
        }
        out
    }
}
