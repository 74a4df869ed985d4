// Latent Dirichlet allocation, fitted with batch variational Bayes.
//
// This is the standard mean-field algorithm (Hoffman, Blei & Bach 2010 in its
// batch form): the topic-word matrix `components` holds the variational
// Dirichlet parameters λ, each document gets a variational γ over topics, and
// every iteration runs an E-step over the whole corpus followed by a closed
// form M-step. Defaults mirror the usual library settings: priors of
// 1/n_topics, 10 passes, Gamma(100, 1/100) initialization, seed 42.
//
// All randomness comes from one seeded `StdRng`, so a given corpus and
// parameter set always produces the same topics.

use anyhow::Result;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma};
use serde::Serialize;
use statrs::function::gamma::digamma;
use tracing::{debug, info};

use crate::vectorize::CountMatrix;

/// Keeps the per-word normalizer away from zero.
const EPS: f64 = f64::EPSILON;

/// Shape of the Gamma used to initialize λ and γ (scale is its inverse).
const INIT_GAMMA_SHAPE: f64 = 100.0;

/// Hyperparameters for an LDA fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LdaParams {
    /// Number of topics to discover.
    pub n_topics: usize,
    /// Full passes over the corpus.
    pub max_iter: usize,
    /// Document-topic Dirichlet prior (α). `None` means 1/n_topics.
    pub doc_topic_prior: Option<f64>,
    /// Topic-word Dirichlet prior (η). `None` means 1/n_topics.
    pub topic_word_prior: Option<f64>,
    /// E-step stops for a document once γ moves less than this on average.
    pub mean_change_tol: f64,
    /// Cap on E-step updates per document.
    pub max_doc_update_iter: usize,
    pub seed: u64,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self {
            n_topics: 5,
            max_iter: 10,
            doc_topic_prior: None,
            topic_word_prior: None,
            mean_change_tol: 1e-3,
            max_doc_update_iter: 100,
            seed: 42,
        }
    }
}

impl LdaParams {
    /// Check that the parameters describe a fittable model.
    pub fn validate(&self) -> Result<()> {
        if self.n_topics == 0 {
            anyhow::bail!("Number of topics must be at least 1");
        }
        if self.max_iter == 0 {
            anyhow::bail!("LDA needs at least one iteration");
        }
        if self.max_doc_update_iter == 0 {
            anyhow::bail!("LDA needs at least one E-step update per document");
        }
        for (name, prior) in [
            ("doc_topic_prior", self.doc_topic_prior),
            ("topic_word_prior", self.topic_word_prior),
        ] {
            if let Some(p) = prior {
                if !(p.is_finite() && p > 0.0) {
                    anyhow::bail!("{name} must be a positive number, got {p}");
                }
            }
        }
        if !(self.mean_change_tol.is_finite() && self.mean_change_tol >= 0.0) {
            anyhow::bail!(
                "mean_change_tol must be non-negative, got {}",
                self.mean_change_tol
            );
        }
        Ok(())
    }

    /// α after applying the 1/n_topics default.
    pub fn alpha(&self) -> f64 {
        self.doc_topic_prior
            .unwrap_or(1.0 / self.n_topics.max(1) as f64)
    }

    /// η after applying the 1/n_topics default.
    pub fn eta(&self) -> f64 {
        self.topic_word_prior
            .unwrap_or(1.0 / self.n_topics.max(1) as f64)
    }
}

/// Fits LDA models with a fixed parameter set.
#[derive(Debug, Clone)]
pub struct LatentDirichlet {
    params: LdaParams,
}

impl LatentDirichlet {
    pub fn new(params: LdaParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Fit a model to `matrix`. `on_iteration` is called after each pass
    /// with the 1-based iteration number.
    pub fn fit<F>(&self, matrix: &CountMatrix, mut on_iteration: F) -> Result<LdaModel>
    where
        F: FnMut(usize),
    {
        let k = self.params.n_topics;
        let v = matrix.n_terms();
        if v == 0 {
            anyhow::bail!("Cannot fit LDA on a matrix with no terms");
        }
        if matrix.n_docs() == 0 {
            anyhow::bail!("Cannot fit LDA on an empty corpus");
        }

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let init = Gamma::new(INIT_GAMMA_SHAPE, 1.0 / INIT_GAMMA_SHAPE)?;

        let components = Array2::from_shape_fn((k, v), |_| init.sample(&mut rng));
        let mut model = LdaModel {
            exp_dirichlet_component: exp_dirichlet_expectation(&components),
            components,
            alpha: self.params.alpha(),
            mean_change_tol: self.params.mean_change_tol,
            max_doc_update_iter: self.params.max_doc_update_iter,
            n_iter: 0,
        };

        let eta = self.params.eta();
        for iteration in 1..=self.params.max_iter {
            let mut sstats = Array2::<f64>::zeros((k, v));
            let mut total_updates = 0usize;
            for row in matrix.rows() {
                let mut gamma: Vec<f64> = (0..k).map(|_| init.sample(&mut rng)).collect();
                total_updates += model.update_document(row, &mut gamma, Some(&mut sstats));
            }

            // M-step: λ = η + sstats ∘ exp(E[log β])
            model.components = sstats * &model.exp_dirichlet_component + eta;
            model.exp_dirichlet_component = exp_dirichlet_expectation(&model.components);
            model.n_iter = iteration;

            debug!(
                iteration,
                mean_doc_updates = total_updates as f64 / matrix.n_docs() as f64,
                "LDA pass complete"
            );
            on_iteration(iteration);
        }

        info!(
            topics = k,
            terms = v,
            documents = matrix.n_docs(),
            iterations = model.n_iter,
            "Fitted LDA model"
        );
        Ok(model)
    }
}

/// A fitted LDA model.
#[derive(Debug, Clone)]
pub struct LdaModel {
    /// Variational topic-word parameters λ, `n_topics × n_terms`.
    components: Array2<f64>,
    /// exp(E[log β]) for the current λ.
    exp_dirichlet_component: Array2<f64>,
    alpha: f64,
    mean_change_tol: f64,
    max_doc_update_iter: usize,
    n_iter: usize,
}

impl LdaModel {
    pub fn n_topics(&self) -> usize {
        self.components.nrows()
    }

    pub fn n_terms(&self) -> usize {
        self.components.ncols()
    }

    /// Passes over the corpus performed during fitting.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// The unnormalized topic-word pseudo-counts.
    pub fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Topic `topic`'s word distribution (sums to 1).
    pub fn topic_word_distribution(&self, topic: usize) -> Vec<f64> {
        let row = self.components.row(topic);
        let total: f64 = row.sum();
        row.iter().map(|w| w / total).collect()
    }

    /// The `n` highest-weighted term indices for `topic`, heaviest first.
    /// Equal weights keep vocabulary order.
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        let row = self.components.row(topic);
        let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n.min(self.n_terms()));
        ranked
    }

    /// Per-document topic distributions (each row sums to 1).
    ///
    /// Uses a deterministic start (γ = 1) so repeated calls agree.
    pub fn transform(&self, matrix: &CountMatrix) -> Result<Vec<Vec<f64>>> {
        if matrix.n_terms() != self.n_terms() {
            anyhow::bail!(
                "Matrix has {} terms but the model was fitted on {}",
                matrix.n_terms(),
                self.n_terms()
            );
        }
        let k = self.n_topics();
        Ok(matrix
            .rows()
            .map(|row| {
                let mut gamma = vec![1.0; k];
                self.update_document(row, &mut gamma, None);
                let total: f64 = gamma.iter().sum();
                gamma.iter().map(|g| g / total).collect()
            })
            .collect())
    }

    /// Run the per-document E-step, refining `gamma` in place. When `sstats`
    /// is given, the document's expected word-topic counts are added to it.
    /// Returns the number of updates performed.
    fn update_document(
        &self,
        row: &[(usize, u32)],
        gamma: &mut [f64],
        sstats: Option<&mut Array2<f64>>,
    ) -> usize {
        let k = gamma.len();
        if row.is_empty() {
            gamma.iter_mut().for_each(|g| *g = self.alpha);
            return 0;
        }

        let counts: Vec<f64> = row.iter().map(|&(_, c)| c as f64).collect();
        let mut exp_doc_topic = exp_dirichlet_expectation_1d(gamma);
        let mut norm_phi = vec![0.0; row.len()];
        let mut updates = 0;

        for _ in 0..self.max_doc_update_iter {
            updates += 1;
            self.normalizers(row, &exp_doc_topic, &mut norm_phi);

            let mut mean_change = 0.0;
            for t in 0..k {
                let dot: f64 = row
                    .iter()
                    .zip(&counts)
                    .zip(&norm_phi)
                    .map(|((&(w, _), &c), &n)| c / n * self.exp_dirichlet_component[[t, w]])
                    .sum();
                let updated = exp_doc_topic[t] * dot + self.alpha;
                mean_change += (updated - gamma[t]).abs();
                gamma[t] = updated;
            }
            exp_doc_topic = exp_dirichlet_expectation_1d(gamma);

            if mean_change / (k as f64) < self.mean_change_tol {
                break;
            }
        }

        if let Some(sstats) = sstats {
            self.normalizers(row, &exp_doc_topic, &mut norm_phi);
            for t in 0..k {
                for ((&(w, _), &c), &n) in row.iter().zip(&counts).zip(&norm_phi) {
                    sstats[[t, w]] += exp_doc_topic[t] * c / n;
                }
            }
        }
        updates
    }

    /// φ normalizers: for each word in the document, Σ_t exp(E[log θ_t]) exp(E[log β_tw]).
    fn normalizers(&self, row: &[(usize, u32)], exp_doc_topic: &[f64], out: &mut [f64]) {
        for (slot, &(w, _)) in out.iter_mut().zip(row) {
            *slot = exp_doc_topic
                .iter()
                .enumerate()
                .map(|(t, e)| e * self.exp_dirichlet_component[[t, w]])
                .sum::<f64>()
                + EPS;
        }
    }
}

/// exp(ψ(x) − ψ(Σx)) for a single Dirichlet parameter vector.
fn exp_dirichlet_expectation_1d(params: &[f64]) -> Vec<f64> {
    let psi_total = digamma(params.iter().sum());
    params
        .iter()
        .map(|&p| (digamma(p) - psi_total).exp())
        .collect()
}

/// Row-wise exp(ψ(λ) − ψ(Σλ)).
fn exp_dirichlet_expectation(params: &Array2<f64>) -> Array2<f64> {
    let mut out = params.clone();
    for mut row in out.rows_mut() {
        let psi_total = digamma(row.sum());
        row.mapv_inplace(|p| (digamma(p) - psi_total).exp());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_matrix() -> CountMatrix {
        // Terms 0-2 co-occur, terms 3-5 co-occur.
        let mut rows = Vec::new();
        for _ in 0..10 {
            rows.push(vec![(0, 3), (1, 2), (2, 2)]);
            rows.push(vec![(3, 3), (4, 2), (5, 2)]);
        }
        CountMatrix::from_rows(rows, 6).unwrap()
    }

    #[test]
    fn test_default_params() {
        let p = LdaParams::default();
        assert_eq!(p.n_topics, 5);
        assert_eq!(p.max_iter, 10);
        assert_eq!(p.seed, 42);
        assert!((p.alpha() - 0.2).abs() < 1e-12);
        assert!((p.eta() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let zero_topics = LdaParams {
            n_topics: 0,
            ..LdaParams::default()
        };
        assert!(zero_topics.validate().is_err());

        let bad_prior = LdaParams {
            doc_topic_prior: Some(-1.0),
            ..LdaParams::default()
        };
        assert!(bad_prior.validate().is_err());

        let no_iters = LdaParams {
            max_iter: 0,
            ..LdaParams::default()
        };
        assert!(LatentDirichlet::new(no_iters).is_err());
    }

    #[test]
    fn test_fit_separates_clusters() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 2,
            max_iter: 30,
            ..LdaParams::default()
        })
        .unwrap();
        let model = lda.fit(&two_cluster_matrix(), |_| {}).unwrap();

        let top_a: Vec<usize> = model.top_terms(0, 3).into_iter().map(|(i, _)| i).collect();
        let top_b: Vec<usize> = model.top_terms(1, 3).into_iter().map(|(i, _)| i).collect();
        let is_first = |v: &[usize]| v.iter().all(|&i| i < 3);
        let is_second = |v: &[usize]| v.iter().all(|&i| i >= 3);
        assert!(
            (is_first(&top_a) && is_second(&top_b)) || (is_second(&top_a) && is_first(&top_b)),
            "topics not separated: {top_a:?} / {top_b:?}"
        );
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 3,
            ..LdaParams::default()
        })
        .unwrap();
        let m = two_cluster_matrix();
        let a = lda.fit(&m, |_| {}).unwrap();
        let b = lda.fit(&m, |_| {}).unwrap();
        assert_eq!(a.components(), b.components());
    }

    #[test]
    fn test_progress_callback_called_each_iteration() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 2,
            max_iter: 4,
            ..LdaParams::default()
        })
        .unwrap();
        let mut seen = Vec::new();
        let model = lda.fit(&two_cluster_matrix(), |i| seen.push(i)).unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(model.n_iter(), 4);
    }

    #[test]
    fn test_top_terms_clamped_and_sorted() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 2,
            ..LdaParams::default()
        })
        .unwrap();
        let model = lda.fit(&two_cluster_matrix(), |_| {}).unwrap();
        let top = model.top_terms(0, 100);
        assert_eq!(top.len(), 6);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_transform_rows_sum_to_one() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 2,
            ..LdaParams::default()
        })
        .unwrap();
        let m = two_cluster_matrix();
        let model = lda.fit(&m, |_| {}).unwrap();
        let dist = model.transform(&m).unwrap();
        assert_eq!(dist.len(), m.n_docs());
        for row in &dist {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        // Documents from different clusters lean toward different topics
        let argmax = |r: &Vec<f64>| if r[0] >= r[1] { 0 } else { 1 };
        assert_ne!(argmax(&dist[0]), argmax(&dist[1]));
    }

    #[test]
    fn test_topic_word_distribution_normalized() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 2,
            ..LdaParams::default()
        })
        .unwrap();
        let model = lda.fit(&two_cluster_matrix(), |_| {}).unwrap();
        let sum: f64 = model.topic_word_distribution(1).iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_terms_ties_keep_vocabulary_order() {
        let components = ndarray::array![[1.0, 2.0, 2.0, 1.0]];
        let model = LdaModel {
            exp_dirichlet_component: exp_dirichlet_expectation(&components),
            components,
            alpha: 1.0,
            mean_change_tol: 1e-3,
            max_doc_update_iter: 100,
            n_iter: 1,
        };
        let order: Vec<usize> = model.top_terms(0, 4).into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_transform_is_repeatable() {
        let lda = LatentDirichlet::new(LdaParams {
            n_topics: 3,
            ..LdaParams::default()
        })
        .unwrap();
        let m = two_cluster_matrix();
        let model = lda.fit(&m, |_| {}).unwrap();
        assert_eq!(model.transform(&m).unwrap(), model.transform(&m).unwrap());
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        let lda = LatentDirichlet::new(LdaParams::default()).unwrap();
        let empty = CountMatrix::from_rows(vec![], 3).unwrap();
        assert!(lda.fit(&empty, |_| {}).is_err());
        let no_terms = CountMatrix::from_rows(vec![vec![]], 0).unwrap();
        assert!(lda.fit(&no_terms, |_| {}).is_err());
    }
}
