//! Prompt catalog: a static mapping from task name to a fixed two-message
//! prompt template.
//!
//! Every task resolves to exactly one `system` instruction and one `user`
//! message built from a template with named placeholders. Resolution is
//! side-effect-free; image attachment for the vision task is done by the
//! dispatcher after resolution.

use thiserror::Error;

use crate::llm::Message;

pub const TASK_TRANSLATION: &str = "Traducción";
pub const TASK_SUMMARY: &str = "Resumen";
pub const TASK_VQA: &str = "VQA";

/// Fallback language pair when the front end sends none.
pub const DEFAULT_SOURCE_LANG: &str = "inglés";
pub const DEFAULT_TARGET_LANG: &str = "español";

/// Languages offered by the front end for the translation task.
pub const AVAILABLE_LANGUAGES: &[&str] = &[
    "español",
    "inglés",
    "francés",
    "alemán",
    "italiano",
    "portugués",
    "chino",
    "japonés",
];

struct TaskPrompt {
    name: &'static str,
    system: &'static str,
    user_template: &'static str,
}

const TASK_PROMPTS: &[TaskPrompt] = &[
    TaskPrompt {
        name: TASK_TRANSLATION,
        system: "Eres un traductor profesional. Tu tarea es traducir el texto del usuario \
                 del idioma de origen al idioma destino solicitado. Proporciona SOLO la \
                 traducción, sin explicaciones adicionales.",
        user_template: "Traduce el siguiente texto de {source_lang} a {target_lang}:\n\n{text}",
    },
    TaskPrompt {
        name: TASK_SUMMARY,
        system: "Eres un asistente experto en resumir textos. Proporciona resúmenes \
                 concisos y precisos que capturen las ideas principales.",
        user_template: "Resume el siguiente texto de manera concisa:\n\n{text}",
    },
    TaskPrompt {
        name: TASK_VQA,
        system: "Eres un asistente visual. Responde a la pregunta del usuario sobre la \
                 imagen proporcionada de forma clara y directa.",
        user_template: "{text}",
    },
];

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Tarea '{0}' no encontrada")]
    TaskNotFound(String),
}

/// Registered task names, in declaration order.
pub fn all_tasks() -> Vec<&'static str> {
    TASK_PROMPTS.iter().map(|prompt| prompt.name).collect()
}

/// Resolve a task name and free-form input into the two-message prompt.
///
/// The translation task substitutes `{source_lang}`/`{target_lang}`,
/// falling back to the default pair when either is absent or empty.
/// Every other task substitutes only `{text}` and ignores language
/// arguments.
pub fn resolve(
    task_id: &str,
    input_text: &str,
    source_lang: Option<&str>,
    target_lang: Option<&str>,
) -> Result<Vec<Message>, PromptError> {
    let prompt = TASK_PROMPTS
        .iter()
        .find(|prompt| prompt.name == task_id)
        .ok_or_else(|| PromptError::TaskNotFound(task_id.to_string()))?;

    let user_message = if task_id == TASK_TRANSLATION {
        let source = source_lang
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_SOURCE_LANG);
        let target = target_lang
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_TARGET_LANG);
        prompt
            .user_template
            .replace("{source_lang}", source)
            .replace("{target_lang}", target)
            .replace("{text}", input_text)
    } else {
        prompt.user_template.replace("{text}", input_text)
    };

    Ok(vec![
        Message::system(prompt.system),
        Message::user(user_message),
    ])
}
