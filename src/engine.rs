//! The incremental move-cost engine.
//!
//! Owns the mutable search state (permutation `p`, cost `c`, delta matrix
//! `Δ`) and exposes the swap primitives every heuristic drives. The
//! recurrence is E. Taillard's O(n) delta update for a pairwise swap.

use crate::instance::Instance;

/// The Δ-engine. Borrows the immutable instance for as long as a search runs
/// against it.
pub struct Engine<'a> {
    instance: &'a Instance,
    p: Vec<usize>,
    cost: i64,
    /// Strictly upper triangular: only `delta[i][j]` with `i < j` is meaningful.
    delta: Vec<Vec<i64>>,
    self_check: bool,
}

impl<'a> Engine<'a> {
    /// Builds an engine around `instance` with initial permutation `p`,
    /// computing cost and the full delta matrix from scratch.
    pub fn new(instance: &'a Instance, p: Vec<usize>) -> Self {
        assert_eq!(p.len(), instance.n, "initial permutation has wrong size");
        let n = instance.n;
        let mut engine = Engine {
            instance,
            p,
            cost: 0,
            delta: vec![vec![0; n]; n],
            self_check: false,
        };
        engine.set_solution(engine.p.clone());
        engine
    }

    /// Enables the debug self-check: every `do_swap` recomputes the true
    /// cost and panics on mismatch. Invariant violations here are programmer
    /// bugs, not recoverable errors.
    pub fn with_self_check(mut self, enabled: bool) -> Self {
        self.self_check = enabled;
        self
    }

    pub fn n(&self) -> usize {
        self.instance.n
    }

    pub fn instance(&self) -> &Instance {
        self.instance
    }

    pub fn p(&self) -> &[usize] {
        &self.p
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Full O(n^3) recomputation of the cost of an arbitrary permutation.
    pub fn cost_of(&self, p: &[usize]) -> i64 {
        let a = &self.instance.a;
        let b = &self.instance.b;
        let n = self.instance.n;
        let mut cost = 0i64;
        for i in 0..n {
            for j in 0..n {
                cost += a[i][j] * b[p[i]][p[j]];
            }
        }
        cost
    }

    /// O(n) Taillard delta formula for swapping positions `i`, `j` of the
    /// *current* permutation.
    pub fn compute_delta(&self, i: usize, j: usize) -> i64 {
        let a = &self.instance.a;
        let b = &self.instance.b;
        let p = &self.p;
        let n = self.instance.n;
        let pi = p[i];
        let pj = p[j];
        let mut d = (a[i][i] - a[j][j]) * (b[pj][pj] - b[pi][pi])
            + (a[i][j] - a[j][i]) * (b[pj][pi] - b[pi][pj]);
        for k in 0..n {
            if k != i && k != j {
                let pk = p[k];
                d += (a[k][i] - a[k][j]) * (b[pk][pj] - b[pk][pi])
                    + (a[i][k] - a[j][k]) * (b[pj][pk] - b[pi][pk]);
            }
        }
        d
    }

    /// Fills the whole strictly-upper-triangular delta matrix, O(n^3).
    pub fn compute_all_delta(&mut self) {
        let n = self.instance.n;
        for i in 0..n {
            self.delta[i][i] = 0;
            for j in (i + 1)..n {
                self.delta[i][j] = self.compute_delta(i, j);
            }
        }
    }

    pub fn get_delta(&self, i: usize, j: usize) -> i64 {
        if i <= j {
            self.delta[i][j]
        } else {
            self.delta[j][i]
        }
    }

    pub fn cost_if_swap(&self, i: usize, j: usize) -> i64 {
        self.cost + self.get_delta(i, j)
    }

    /// Performs the swap: updates `p` and `c`, then patches every delta
    /// entry in a single O(n^2) pass.
    ///
    /// `p` and `c` are updated *before* delta is rewritten, and the rewrite
    /// reads old delta values before overwriting them — via a scratch
    /// matrix, so no entry is patched using an already-patched neighbor.
    pub fn do_swap(&mut self, i: usize, j: usize) -> i64 {
        let (r, s) = if i < j { (i, j) } else { (j, i) };
        let new_cost = self.cost_if_swap(r, s);
        self.p.swap(r, s);
        self.cost = new_cost;
        self.patch_delta_after_swap(r, s);

        if self.self_check {
            let true_cost = self.cost_of(&self.p);
            assert_eq!(
                self.cost, true_cost,
                "Δ-engine invariant violated after swap ({r},{s})"
            );
        }
        self.cost
    }

    fn patch_delta_after_swap(&mut self, r: usize, s: usize) {
        let n = self.instance.n;
        let a = &self.instance.a;
        let b = &self.instance.b;
        let p = &self.p;
        let pr = p[r];
        let ps = p[s];

        let mut new_delta = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                new_delta[i][j] = if i == r || i == s || j == r || j == s {
                    self.compute_delta(i, j)
                } else {
                    let pi = p[i];
                    let pj = p[j];
                    self.delta[i][j]
                        + (a[r][i] - a[r][j] + a[s][j] - a[s][i])
                            * (b[ps][pi] - b[ps][pj] + b[pr][pj] - b[pr][pi])
                        + (a[i][r] - a[j][r] + a[j][s] - a[i][s])
                            * (b[pi][ps] - b[pj][ps] + b[pj][pr] - b[pi][pr])
                };
            }
        }
        self.delta = new_delta;
    }

    /// Replaces `p` wholesale and recomputes cost and delta from scratch.
    pub fn set_solution(&mut self, p: Vec<usize>) {
        assert_eq!(p.len(), self.instance.n, "solution has wrong size");
        self.p = p;
        self.cost = self.cost_of(&self.p);
        self.compute_all_delta();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng32;

    fn nug5() -> Instance {
        let text = "5\n0 1 1 2 3\n1 0 2 1 2\n1 2 0 1 2\n2 1 1 0 1\n3 2 2 1 0\n\n0 5 2 4 1\n5 0 3 0 2\n2 3 0 0 0\n4 0 0 0 5\n1 2 0 5 0\n";
        Instance::parse(text, "nug5").unwrap()
    }

    #[test]
    fn cost_matches_full_recompute_after_init() {
        let inst = nug5();
        let engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        assert_eq!(engine.cost(), engine.cost_of(engine.p()));
    }

    #[test]
    fn delta_matches_true_cost_difference() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        for i in 0..inst.n {
            for j in (i + 1)..inst.n {
                let before = engine.cost_of(engine.p());
                let mut swapped = engine.p().to_vec();
                swapped.swap(i, j);
                let after = engine.cost_of(&swapped);
                assert_eq!(engine.get_delta(i, j), after - before);
            }
        }
        // silence unused mut warning if body above never mutates engine
        let _ = &mut engine;
    }

    #[test]
    fn fuzz_delta_consistency_over_random_swaps() {
        let mut rng = Rng32::new(99);
        let n = 10;
        let mut a = vec![vec![0i64; n]; n];
        let mut b = vec![vec![0i64; n]; n];
        for i in 0..n {
            for j in 0..n {
                a[i][j] = rng.uniform_interval(0, 99);
                b[i][j] = rng.uniform_interval(0, 99);
            }
        }
        let inst = Instance {
            n,
            a,
            b,
            opt: 0,
            bound: 0,
            bks: 0,
            file_name: "fuzz".into(),
        };
        let mut perm: Vec<usize> = (0..n).collect();
        rng.shuffle(&mut perm);
        let mut engine = Engine::new(&inst, perm).with_self_check(true);

        for _ in 0..1000 {
            let i = rng.uniform_index(n);
            let mut j = rng.uniform_index(n);
            while j == i {
                j = rng.uniform_index(n);
            }
            engine.do_swap(i, j);
            assert_eq!(engine.cost(), engine.cost_of(engine.p()));

            let pi = rng.uniform_index(n);
            let mut pj = rng.uniform_index(n);
            while pj == pi {
                pj = rng.uniform_index(n);
            }
            let before = engine.cost();
            let mut probe = engine.p().to_vec();
            probe.swap(pi, pj);
            let after = engine.cost_of(&probe);
            assert_eq!(engine.get_delta(pi, pj), after - before);
        }
    }

    #[test]
    fn set_solution_recomputes_cost_and_delta() {
        let inst = nug5();
        let mut engine = Engine::new(&inst, vec![0, 1, 2, 3, 4]);
        engine.set_solution(vec![4, 3, 2, 1, 0]);
        assert_eq!(engine.cost(), engine.cost_of(engine.p()));
    }
}
