mod medical;
pub mod prompts;

pub use medical::MedicalAssistant;
