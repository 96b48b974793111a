//! # Esquema de Tags BIO e Tipos de Entidade
//!
//! Os modelos de classificação de tokens emitem, para cada sub-palavra, um rótulo
//! no esquema **BIO** (Beginning-Inside-Outside):
//!
//! - `B-TAG`: Begin — primeiro token de uma entidade
//! - `I-TAG`: Inside — tokens subsequentes da mesma entidade
//! - `O`: Outside — não é parte de nenhuma entidade
//!
//! Os rótulos chegam como strings vindas de um motor externo, então o parsing
//! aqui é permissivo: qualquer coisa que não seja `B-X` ou `I-X` é tratada como
//! rótulo sem prefixo e nunca continua uma entidade.
//!
//! ## Categorias do modelo de demonstração (CoNLL-2003)
//!
//! | Tipo | Significado      | Exemplos                    |
//! |------|------------------|-----------------------------|
//! | PER  | Pessoa           | Andrew, Poli                |
//! | ORG  | Organização      | DeeplearningAI, HuggingFace |
//! | LOC  | Local            | California, Vienna          |
//! | MISC | Miscelânea       | Python, Olympics            |

use serde::{Deserialize, Serialize};

/// Prefixo BIO de um rótulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelPrefix {
    /// `B-`: início de entidade.
    Begin,
    /// `I-`: continuação de entidade.
    Inside,
}

impl LabelPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelPrefix::Begin => "B-",
            LabelPrefix::Inside => "I-",
        }
    }
}

/// Um rótulo decomposto em prefixo e tipo.
///
/// # Exemplo
/// `"I-ORG"` → `ParsedLabel { prefix: Some(Inside), kind: Some("ORG") }`
/// `"O"` → `ParsedLabel { prefix: None, kind: None }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedLabel<'a> {
    pub prefix: Option<LabelPrefix>,
    pub kind: Option<&'a str>,
}

impl<'a> ParsedLabel<'a> {
    /// `I-X` com tipo não vazio.
    pub fn is_continuation(&self) -> bool {
        self.prefix == Some(LabelPrefix::Inside) && self.kind.is_some()
    }
}

/// Separa o prefixo BIO do tipo da entidade.
///
/// Apenas `B-` e `I-` (maiúsculos) são reconhecidos; um tipo vazio (`"B-"`)
/// conta como rótulo malformado.
pub fn parse_label(label: &str) -> ParsedLabel<'_> {
    let (prefix, rest) = if let Some(rest) = label.strip_prefix("B-") {
        (LabelPrefix::Begin, rest)
    } else if let Some(rest) = label.strip_prefix("I-") {
        (LabelPrefix::Inside, rest)
    } else {
        return ParsedLabel { prefix: None, kind: None };
    };

    if rest.is_empty() {
        return ParsedLabel { prefix: None, kind: None };
    }
    ParsedLabel {
        prefix: Some(prefix),
        kind: Some(rest),
    }
}

/// Tipo da entidade (sufixo após `B-`/`I-`), se houver.
pub fn label_kind(label: &str) -> Option<&str> {
    parse_label(label).kind
}

/// Tipo de um rótulo já aberto: o que vem depois de `B-`/`I-`, ou o rótulo
/// inteiro quando não há prefixo (`"PER"` → `"PER"`, `"O"` → `"O"`).
pub fn open_kind(label: &str) -> &str {
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// Monta um rótulo a partir de prefixo e tipo (ex: `Begin`, `"PER"` → `"B-PER"`).
pub fn make_label(prefix: LabelPrefix, kind: &str) -> String {
    format!("{}{}", prefix.as_str(), kind)
}

/// Rótulo "fora de entidade".
pub const OUTSIDE: &str = "O";

/// Categorias de entidade conhecidas pela interface.
///
/// Rótulos com outros tipos continuam funcionando no pipeline; só não ganham
/// cor/ícone próprios na UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// **Pessoa**: nomes de humanos reais ou fictícios.
    Per,
    /// **Organização**: empresas, instituições, times.
    Org,
    /// **Localização**: países, cidades, estados.
    Loc,
    /// **Miscelânea**: eventos, nacionalidades, obras.
    Misc,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Per,
        EntityCategory::Org,
        EntityCategory::Loc,
        EntityCategory::Misc,
    ];

    /// Nome da categoria como string (para serialização e UI)
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::Per => "PER",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }

    /// Cor CSS para highlight na UI
    pub fn color(&self) -> &'static str {
        match self {
            EntityCategory::Per => "#3b82f6",  // azul
            EntityCategory::Org => "#10b981",  // verde esmeralda
            EntityCategory::Loc => "#f59e0b",  // âmbar
            EntityCategory::Misc => "#8b5cf6", // violeta
        }
    }

    /// Ícone emoji para a categoria
    pub fn icon(&self) -> &'static str {
        match self {
            EntityCategory::Per => "👤",
            EntityCategory::Org => "🏢",
            EntityCategory::Loc => "📍",
            EntityCategory::Misc => "🔖",
        }
    }

    /// Tenta parsear a partir do tipo (ex: "PER" → Some(Per))
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "PER" => Some(EntityCategory::Per),
            "ORG" => Some(EntityCategory::Org),
            "LOC" => Some(EntityCategory::Loc),
            "MISC" => Some(EntityCategory::Misc),
            _ => None,
        }
    }

    /// Categoria de um rótulo completo (ex: "I-LOC" → Some(Loc))
    pub fn from_label(label: &str) -> Option<Self> {
        label_kind(label).and_then(Self::from_kind)
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
