//! Information content and semantic similarity of terms.
//!
//! All queries here are read-only and assume the cohort has been tallied
//! (see [`Ontology::tally_cohort`]).  Once the tally is frozen they can be
//! fanned out across threads without locking.

use super::{Ontology, OntologyError, TermId};

impl Ontology {
    /// The information content of a term: the negative natural logarithm of
    /// the fraction of tallied cohort members whose ancestor closure
    /// contains the term.
    ///
    /// The root yields exactly 0.0, as does any other term tallied for every
    /// single member.  A term with a zero count is a domain error
    /// ([`OntologyError::UntalliedTerm`]): the ratio is zero and the
    /// logarithm undefined, and silently returning 0.0 would wrongly mark
    /// the term as uninformative.
    pub fn information_content(&self, term_id: TermId) -> Result<f64, OntologyError> {
        let canonical = self.canonical_id(term_id)?;
        let count = self.term_count(canonical)?;
        if count == 0 {
            return Err(OntologyError::UntalliedTerm(canonical));
        }
        // count(root) >= count(term) for every term, so the total is
        // positive here and the ratio is in (0, 1].  -ln(count/total) is
        // written as ln(total/count) so a term tallied for the whole cohort
        // yields +0.0 rather than IEEE -0.0.
        let total = self.cohort_size();
        Ok((total as f64 / count as f64).ln())
    }

    /// The information content of the most informative common ancestor of
    /// two terms, the Resnik-style pairwise similarity value.
    ///
    /// The intersection of the two ancestor closures is never empty since
    /// the root is an ancestor of every term.  Identical terms yield the
    /// term's own information content; two terms whose only shared ancestor
    /// is the root yield 0.0.  Both follow from the general rule.
    pub fn most_informative_ic(&self, a: TermId, b: TermId) -> Result<f64, OntologyError> {
        let a = self.canonical_id(a)?;
        let b = self.canonical_id(b)?;
        let ancestors_a = self
            .ancestors
            .get(&a)
            .expect("every live term has a memoized closure");
        let ancestors_b = self
            .ancestors
            .get(&b)
            .expect("every live term has a memoized closure");

        let mut best = f64::NEG_INFINITY;
        for &shared in ancestors_a.intersection(ancestors_b) {
            best = best.max(self.information_content(shared)?);
        }
        Ok(best)
    }

    /// Symmetric similarity between two term sets: the average of the two
    /// directed scores, where each directed score is the mean over the query
    /// terms of the best [`Ontology::most_informative_ic`] against any
    /// target term.
    pub fn similarity_score(&self, query: &[TermId], target: &[TermId]) -> Result<f64, OntologyError> {
        Ok((self.score_directed(query, target)? + self.score_directed(target, query)?) / 2.0)
    }

    /// One direction of [`Ontology::similarity_score`]; an empty query or
    /// target side contributes 0.
    fn score_directed(&self, query: &[TermId], target: &[TermId]) -> Result<f64, OntologyError> {
        if query.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for &q in query {
            let mut best = 0.0f64;
            for &d in target {
                best = best.max(self.most_informative_ic(q, d)?);
            }
            total += best;
        }
        Ok(total / query.len() as f64)
    }
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;

    use crate::ontology::test::{fixture, three_person_cohort};
    use crate::ontology::{Ontology, OntologyError, TermId};

    fn t(s: &str) -> TermId {
        s.parse().expect("valid term id")
    }

    fn tallied_fixture() -> Ontology {
        let mut ontology = fixture();
        ontology.tally_cohort(&three_person_cohort());
        ontology
    }

    #[test]
    fn information_content_of_root_is_zero() {
        let ontology = tallied_fixture();
        assert_eq!(
            ontology.information_content(t("HP:0000001")).unwrap(),
            0.0
        );
    }

    #[test]
    fn information_content_of_universal_term_is_zero() {
        let ontology = tallied_fixture();
        // HP:0000118 is not the root but is implied by every cohort member
        assert_eq!(
            ontology.information_content(t("HP:0000118")).unwrap(),
            0.0
        );
    }

    #[rstest::rstest]
    #[case("HP:0000924", 1)]
    #[case("HP:0000707", 2)]
    #[case("HP:0002011", 2)]
    fn information_content_values(#[case] term: &str, #[case] count: u64) {
        let ontology = tallied_fixture();
        let expected = -((count as f64 / 3.0).ln());
        let actual = ontology.information_content(t(term)).unwrap();
        assert!(
            approx_eq!(f64, expected, actual, ulps = 2),
            "term {}: expected {}, got {}",
            term,
            expected,
            actual
        );
    }

    #[test]
    fn information_content_rejects_untallied_term() {
        let ontology = tallied_fixture();
        // HP:0001250 is in the graph but in no cohort member's closure
        assert!(matches!(
            ontology.information_content(t("HP:0001250")),
            Err(OntologyError::UntalliedTerm(_))
        ));
    }

    #[test]
    fn information_content_monotonicity_over_ancestors() {
        let ontology = tallied_fixture();
        for term in ontology.terms() {
            if term.count() == 0 {
                continue;
            }
            let ic = ontology.information_content(term.id()).unwrap();
            for &ancestor in ontology.ancestors_of(term.id()).unwrap() {
                let ancestor_ic = ontology.information_content(ancestor).unwrap();
                assert!(
                    ancestor_ic <= ic,
                    "IC({}) > IC({})",
                    ancestor,
                    term.id()
                );
            }
        }
    }

    #[test]
    fn most_informative_ic_only_shared_ancestor_is_uninformative() {
        let ontology = tallied_fixture();
        // all common ancestors of these two terms are implied by the whole
        // cohort, so the score is 0
        assert_eq!(
            ontology
                .most_informative_ic(t("HP:0000707"), t("HP:0000924"))
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn most_informative_ic_mid_graph_pair() {
        let ontology = tallied_fixture();
        let actual = ontology
            .most_informative_ic(t("HP:0000707"), t("HP:0002011"))
            .unwrap();
        let expected = -(2.0f64 / 3.0).ln();
        assert!(approx_eq!(f64, expected, actual, ulps = 2));
    }

    #[test]
    fn most_informative_ic_reflexivity() {
        let ontology = tallied_fixture();
        for term in ["HP:0000924", "HP:0000707", "HP:0002011", "HP:0000118"] {
            let ic = ontology.information_content(t(term)).unwrap();
            let mica = ontology.most_informative_ic(t(term), t(term)).unwrap();
            assert!(approx_eq!(f64, ic, mica, ulps = 2), "term {}", term);
        }
    }

    #[test]
    fn most_informative_ic_symmetry() {
        let ontology = tallied_fixture();
        let terms = ["HP:0000924", "HP:0000707", "HP:0002011", "HP:0000118"];
        for a in terms {
            for b in terms {
                let ab = ontology.most_informative_ic(t(a), t(b)).unwrap();
                let ba = ontology.most_informative_ic(t(b), t(a)).unwrap();
                assert!(approx_eq!(f64, ab, ba, ulps = 2), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn similarity_score_singletons_match_most_informative_ic() {
        let ontology = tallied_fixture();
        let expected = -(2.0f64 / 3.0).ln();
        let actual = ontology
            .similarity_score(&[t("HP:0002011")], &[t("HP:0000707")])
            .unwrap();
        assert!(approx_eq!(f64, expected, actual, ulps = 2));
    }

    #[test]
    fn similarity_score_symmetric_and_empty_sides() {
        let ontology = tallied_fixture();
        let query = [t("HP:0000924"), t("HP:0002011")];
        let target = [t("HP:0000707")];
        let ab = ontology.similarity_score(&query, &target).unwrap();
        let ba = ontology.similarity_score(&target, &query).unwrap();
        assert!(approx_eq!(f64, ab, ba, ulps = 2));

        assert_eq!(ontology.similarity_score(&[], &target).unwrap(), 0.0);
        assert_eq!(ontology.similarity_score(&[], &[]).unwrap(), 0.0);
    }
}
