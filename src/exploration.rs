use rand::Rng;

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy
///
/// `epsilon` is public so a driver can change it between episodes, e.g. set it to `0.0`
/// to evaluate the learned policy greedily.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    pub epsilon: f32,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Invoke the policy, exploring with probability `epsilon`
    ///
    /// An epsilon of `0.0` never explores and an epsilon of `1.0` always does.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen_bool(f64::from(self.epsilon.clamp(0.0, 1.0))) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }
}

/// Index of the first maximum element, or `None` if `values` is empty
///
/// Unlike [`Iterator::max_by`], which keeps the last of equal elements, ties go to the
/// element that comes first. Incomparable values (NaN) are skipped, unless every value is
/// incomparable, then the first index is returned.
pub fn first_argmax<T: PartialOrd>(values: impl IntoIterator<Item = T>) -> Option<usize> {
    let incomparable = |x: &T| x.partial_cmp(x).is_none();
    let mut best: Option<(usize, T)> = None;
    for (i, x) in values.into_iter().enumerate() {
        let replace = match &best {
            None => true,
            Some((_, b)) if incomparable(b) => !incomparable(&x),
            Some((_, b)) => x > *b,
        };
        if replace {
            best = Some((i, x));
        }
    }
    best.map(|(i, _)| i)
}
