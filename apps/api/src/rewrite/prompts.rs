// Prompt templates for the description rewrite feature.

pub const REWRITE_SYSTEM: &str = "\
You are a senior copywriter for a premium lifestyle brand. \
You keep every fact from the source and never invent new ones.";

pub const REWRITE_PROMPT: &str = r#"Rewrite the following profile description in a witty, clever marketing style in the spirit of Apple's product copy. Make it engaging, sophisticated and slightly playful, while keeping all of the original information.

ORIGINAL TEXT:
{text}

REWRITTEN TEXT:"#;

pub const TRANSLATE_SYSTEM: &str = "\
You are a professional marketing translator. \
You preserve tone, wit and meaning rather than translating word by word.";

pub const TRANSLATE_PROMPT: &str = r#"Translate the following English text into {language}. Keep the witty marketing style.

ENGLISH TEXT:
{text}

{language} TRANSLATION:"#;
