pub mod decay;
pub mod diagnostics;
pub mod hard;
pub mod independence;
pub mod labeler;
pub mod ttbm;

pub use decay::Decay;
pub use diagnostics::BarrierDiagnostics;
pub use hard::HardBarrierLabeler;
pub use independence::IndependenceReport;
pub use labeler::EventLabeler;
pub use ttbm::TtbmLabeler;
