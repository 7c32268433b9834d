//! Sparse, pre-normalized transition lookup.
//!
//! The compiled model stores a dense `[n_states, n_actions, n_states]`
//! weight tensor. Stepping only ever needs the non-zero destinations of
//! one `(state, action)` row, so [`TransitionTable`] flattens each row
//! once into (destination, cumulative probability) pairs plus an argmax
//! entry. Per-step lookups are then a slice index and, for branching
//! rows, one binary search.

use onedee_fsm::CompiledModel;
use rand::Rng;

use crate::config::TransitionMode;

/// Per-row outcome lists in CSR layout.
#[derive(Clone, Debug)]
pub(crate) struct TransitionTable {
    n_actions: usize,
    /// `offsets[row]..offsets[row + 1]` indexes `dests`/`cumulative`.
    offsets: Vec<usize>,
    dests: Vec<u32>,
    /// Cumulative normalized weight; the last entry of each row is 1.0.
    cumulative: Vec<f64>,
    /// Highest-weight destination per row, lowest index on ties.
    argmax: Vec<Option<u32>>,
}

impl TransitionTable {
    pub(crate) fn from_model(model: &CompiledModel) -> Self {
        let n_states = model.n_states();
        let n_actions = model.n_actions();
        let n_rows = n_states * n_actions;

        let mut offsets = Vec::with_capacity(n_rows + 1);
        let mut dests = Vec::new();
        let mut cumulative = Vec::new();
        let mut argmax = Vec::with_capacity(n_rows);
        offsets.push(0);

        for row in model.trans_table().chunks(n_states.max(1)).take(n_rows) {
            let total: f64 = row.iter().map(|&p| f64::from(p)).sum();
            let mut best: Option<(u32, f32)> = None;
            let mut acc = 0.0f64;
            let row_start = dests.len();
            for (dst, &p) in row.iter().enumerate() {
                if p <= 0.0 {
                    continue;
                }
                acc += f64::from(p);
                dests.push(dst as u32);
                cumulative.push(acc / total);
                if best.is_none_or(|(_, w)| p > w) {
                    best = Some((dst as u32, p));
                }
            }
            if dests.len() > row_start {
                // Guard the last bucket against rounding below 1.0.
                if let Some(last) = cumulative.last_mut() {
                    *last = 1.0;
                }
            }
            offsets.push(dests.len());
            argmax.push(best.map(|(d, _)| d));
        }

        Self {
            n_actions,
            offsets,
            dests,
            cumulative,
            argmax,
        }
    }

    /// Choose the destination for `current --action-->`.
    ///
    /// Rows with no outcome return `current`. Rows with exactly one
    /// outcome never draw from `rng`.
    pub(crate) fn select<R: Rng>(
        &self,
        current: u32,
        action: u32,
        mode: TransitionMode,
        rng: &mut R,
    ) -> u32 {
        let row = current as usize * self.n_actions + action as usize;
        match mode {
            TransitionMode::Deterministic => self.argmax[row].unwrap_or(current),
            TransitionMode::Stochastic => {
                let (start, end) = (self.offsets[row], self.offsets[row + 1]);
                match end - start {
                    0 => current,
                    1 => self.dests[start],
                    _ => {
                        let u: f64 = rng.random();
                        let cum = &self.cumulative[start..end];
                        let k = cum.partition_point(|&c| c <= u).min(cum.len() - 1);
                        self.dests[start + k]
                    }
                }
            }
        }
    }

    /// Number of outcomes stored for a row.
    #[cfg(test)]
    fn outcomes(&self, state: u32, action: u32) -> usize {
        let row = state as usize * self.n_actions + action as usize;
        self.offsets[row + 1] - self.offsets[row]
    }
}
