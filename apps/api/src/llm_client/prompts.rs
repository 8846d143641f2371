// Shared prompt fragments.
// Each service that needs model calls defines its own prompts.rs alongside it.

/// Persona used for every education-related generation.
pub const EDUCATION_EXPERT_SYSTEM: &str =
    "Eres un experto en educación y aprendizaje personalizado.";

/// Instruction appended to prompts whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Responde ÚNICAMENTE con un objeto JSON válido que siga exactamente el esquema indicado. \
    No incluyas texto antes ni después del JSON. \
    No uses bloques de código markdown. \
    No incluyas explicaciones ni disculpas.";
