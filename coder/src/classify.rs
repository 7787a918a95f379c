//! Equivalence classification of equal-code states.
//!
//! Different codes prove non-isomorphism; equal codes only make two
//! states candidates. Whether a candidate pair is reported as
//! `Isomorphic` or `Unknown` is decided by an injected
//! [`IsomorphismPolicy`] — this crate never invents an exact
//! isomorphism check of its own.

use quarry_store::model::ModelVersion;

/// How two states relate, as far as state codes can tell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StateEquivalence {
    /// Codes differ: definitely not isomorphic. The only guaranteed case.
    Different,
    /// Codes match and the injected policy confirmed isomorphism.
    Isomorphic,
    /// Codes match but the policy could not decide.
    Unknown,
}

/// Verdict of a supplementary isomorphism check.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IsomorphismVerdict {
    /// The pair is isomorphic.
    Confirmed,
    /// The check cannot decide.
    Undecided,
}

/// Supplementary check consulted when two states share a code.
///
/// Implementations may run an exact matcher, a partial one, or nothing at
/// all; the search layers treat `Undecided` as "assume duplicate only if
/// the embedder says codes suffice".
pub trait IsomorphismPolicy {
    /// Decide whether `candidate` is isomorphic to `representative`.
    fn decide(&self, candidate: &ModelVersion, representative: &ModelVersion)
        -> IsomorphismVerdict;
}

/// Default policy: never confirms, so equal codes classify as `Unknown`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UndecidedPolicy;

impl IsomorphismPolicy for UndecidedPolicy {
    fn decide(&self, _: &ModelVersion, _: &ModelVersion) -> IsomorphismVerdict {
        IsomorphismVerdict::Undecided
    }
}

/// Classify a candidate state against a known one.
#[must_use]
pub fn classify(
    candidate_code: u32,
    known_code: u32,
    candidate: &ModelVersion,
    representative: &ModelVersion,
    policy: &dyn IsomorphismPolicy,
) -> StateEquivalence {
    if candidate_code != known_code {
        return StateEquivalence::Different;
    }
    match policy.decide(candidate, representative) {
        IsomorphismVerdict::Confirmed => StateEquivalence::Isomorphic,
        IsomorphismVerdict::Undecided => StateEquivalence::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_store::map::StoreStrategy;
    use quarry_store::model::Model;
    use quarry_store::symbol::Symbol;

    struct AlwaysConfirm;

    impl IsomorphismPolicy for AlwaysConfirm {
        fn decide(&self, _: &ModelVersion, _: &ModelVersion) -> IsomorphismVerdict {
            IsomorphismVerdict::Confirmed
        }
    }

    fn two_versions() -> (ModelVersion, ModelVersion) {
        let mut model = Model::new(vec![Symbol::relation("p", 1)], StoreStrategy::Delta);
        let a = model.commit();
        let b = model.commit();
        (a, b)
    }

    #[test]
    fn different_codes_never_consult_the_policy() {
        let (a, b) = two_versions();
        let result = classify(1, 2, &a, &b, &AlwaysConfirm);
        assert_eq!(result, StateEquivalence::Different);
    }

    #[test]
    fn equal_codes_default_to_unknown() {
        let (a, b) = two_versions();
        assert_eq!(
            classify(7, 7, &a, &b, &UndecidedPolicy),
            StateEquivalence::Unknown
        );
    }

    #[test]
    fn equal_codes_with_confirming_policy_are_isomorphic() {
        let (a, b) = two_versions();
        assert_eq!(
            classify(7, 7, &a, &b, &AlwaysConfirm),
            StateEquivalence::Isomorphic
        );
    }
}
