/// Computation of k-futures and of the induced equivalence classes of states.
pub mod future;
pub use future::{equivalence_classes, k_future, Future, KFutures};

/// The future map, which relates future signatures to the signatures of their successors.
pub mod future_map;
pub use future_map::{future_map, FutureMap};

/// Reconstruction of an automaton from a future map.
pub mod inference;
pub use inference::{infer_model, infer_model_with_signatures, signature_label};

/// The k-tail learner, which ties everything together.
pub mod ktail;
pub use ktail::{ktail, Internals, KTail};
