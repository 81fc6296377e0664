// src/prefilter/keywords.rs
//! Keyword corpus for the pre-filter (Portuguese-language monitoring).
//! Matching is lowercase substring unless a pattern in `patterns.rs` says
//! otherwise.

/// Institutional entities: executive, legislature, courts, regulators.
/// Highest base tier.
pub const INSTITUTIONAL_ENTITIES: &[&str] = &[
    // Executive
    "presidente",
    "vice-presidente",
    "ministro",
    "ministério",
    "governo federal",
    "palácio do planalto",
    "casa civil",
    // Legislative
    "congresso",
    "senado",
    "senador",
    "câmara dos deputados",
    "deputado",
    // Judiciary
    "stf",
    "supremo tribunal federal",
    "stj",
    "justiça federal",
    // Regulators
    "anvisa",
    "anatel",
    "aneel",
    "banco central",
    "ibama",
    "inep",
    "inss",
    // Oversight
    "tse",
    "tcu",
    "tribunal de contas",
    "cgu",
    "controladoria",
    "pgr",
    "ministério público federal",
    "polícia federal",
    // State / municipal
    "governador",
    "assembleia legislativa",
    "prefeito",
    "câmara municipal",
    "vereador",
];

/// Political process and judicial keywords. Second base tier.
pub const POLITICAL_KEYWORDS: &[&str] = &[
    "governo",
    "política",
    "eleição",
    "eleições",
    "partido",
    "coligação",
    "oposição",
    "lei",
    "projeto de lei",
    "medida provisória",
    "decreto",
    "portaria",
    "reforma",
    "aprovado",
    "vetado",
    "sancionado",
    "corrupção",
    "desvio",
    "propina",
    "lavagem de dinheiro",
    "cpi",
    "investigação",
    "inquérito",
    "delação",
    "denúncia",
    "indiciado",
    "réu",
    "condenado",
    "julgamento",
    "sentença",
    "liminar",
    "impeachment",
];

/// Social relevance: rights, public services, environment. Third base tier.
pub const SOCIAL_KEYWORDS: &[&str] = &[
    "direitos humanos",
    "violência",
    "segurança pública",
    "chacina",
    "saúde pública",
    "sus",
    "hospital público",
    "escola pública",
    "universidade pública",
    "desigualdade",
    "pobreza",
    "fome",
    "desemprego",
    "greve",
    "manifestação",
    "meio ambiente",
    "desmatamento",
    "queimada",
    "mudança climática",
    "poluição",
    "indígena",
    "quilombola",
    "demarcação",
    "racismo",
    "discriminação",
];

/// Health and science topics share the lowest base tier.
pub const HEALTH_KEYWORDS: &[&str] = &[
    "vacina",
    "vacinação",
    "imunização",
    "covid",
    "coronavirus",
    "pandemia",
    "epidemia",
    "surto",
    "vírus",
    "doença",
    "saúde",
    "hospital",
    "uti",
    "leito",
    "médico",
    "tratamento",
    "medicamento",
    "remédio",
    "ministério da saúde",
    "vigilância sanitária",
];

pub const SCIENCE_KEYWORDS: &[&str] = &[
    "cientista",
    "pesquisador",
    "pesquisa",
    "estudo",
    "descoberta",
    "experimento",
    "universidade",
    "instituto de pesquisa",
    "ciência",
    "científico",
    "artigo científico",
    "revista científica",
    "nasa",
    "fapesp",
    "cnpq",
];

/// Attribution verbs and reverse-attribution connectors ("segundo X").
pub const ATTRIBUTION_KEYWORDS: &[&str] = &[
    "afirmou",
    "afirma",
    "declarou",
    "declara",
    "confirmou",
    "confirma",
    "anunciou",
    "anuncia",
    "revelou",
    "revela",
    "garantiu",
    "garante",
    "disse",
    "alegou",
    "defendeu",
    "criticou",
    "acusou",
    "negou",
    "segundo",
    "de acordo com",
    "conforme",
    "comprovou",
    "demonstrou",
    "apontou",
    "aponta",
];

/// Non-checkable speculation markers. Heavy per-occurrence penalty.
pub const SPECULATION_KEYWORDS: &[&str] = &[
    "pode ser que",
    "é possível que",
    "provavelmente",
    "possivelmente",
    "talvez",
    "há rumores",
    "dizem que",
    "fontes não identificadas",
    "acredita-se",
    "aparentemente",
    "supostamente",
    "presumivelmente",
];

/// Vague quantifiers. Mild penalty, waived for official guidance.
pub const VAGUE_QUANTIFIERS: &[&str] = &[
    "alguns",
    "diversos",
    "vários",
    "muitos",
    "poucos",
    "em breve",
    "logo",
    "futuramente",
    "em algum momento",
];

/// Regulatory/legal directive phrasing. These read vague but are checkable
/// against the norm they cite.
pub const OFFICIAL_GUIDANCE_KEYWORDS: &[&str] = &[
    "é recomendado",
    "é recomendável",
    "orienta-se",
    "deve-se",
    "é obrigatório",
    "é obrigatória",
    "é necessário",
    "é exigido",
    "determina que",
    "conforme determina",
    "segundo a lei",
    "nos termos da",
    "deve conter",
];

/// Health/safety advisory vocabulary; elevated public-interest urgency.
pub const HEALTH_ADVISORY_KEYWORDS: &[&str] = &[
    "vigilância sanitária",
    "anvisa",
    "ministério da saúde",
    "alerta sanitário",
    "orientação sanitária",
    "risco à saúde",
    "intoxicação",
    "contaminação",
    "surto",
    "secretaria de saúde",
];

/// Entertainment vocabulary; penalized as low fact-check value.
pub const ENTERTAINMENT_KEYWORDS: &[&str] = &[
    "bbb",
    "big brother",
    "a fazenda",
    "reality show",
    "paredão",
    "celebridade",
    "famoso",
    "famosa",
    "influencer",
    "namoro",
    "separação",
    "novela",
    "série",
    "filme",
    "estreia",
    "trailer",
    "capítulo",
    "episódio",
    "temporada",
    "álbum",
    "clipe",
    "turnê",
    "meme",
    "viralizou",
    "tiktoker",
    "youtuber",
];

/// Sports vocabulary; penalized unless a controversy keyword co-occurs.
pub const SPORTS_KEYWORDS: &[&str] = &[
    "gol",
    "placar",
    "vitória",
    "derrota",
    "empate",
    "venceu",
    "perdeu",
    "empatou",
    "partida",
    "rodada",
    "clássico",
    "pênalti",
    "campeonato",
    "torneio",
    "libertadores",
    "brasileirão",
    "champions league",
    "jogador",
    "atleta",
    "técnico",
    "árbitro",
    "torcida",
    "estádio",
];

/// Overrides the sports penalty: scandal coverage is checkable.
pub const CONTROVERSY_KEYWORDS: &[&str] = &[
    "corrupção",
    "investigação",
    "investigado",
    "denúncia",
    "escândalo",
    "fraude",
    "manipulação",
    "doping",
    "suborno",
    "propina",
    "irregularidade",
    "ilegal",
];

/// Navigation chrome and CTAs; presence marks the text as scrape noise.
pub const NOISE_TERMS: &[&str] = &[
    "clique aqui",
    "clique para",
    "veja mais",
    "saiba mais",
    "leia mais",
    "acesse",
    "confira",
    "veja também",
    "últimas notícias",
];

/// Case-insensitive substring check against an already lowercased haystack.
pub fn any_match(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

pub fn count_matches(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| text.contains(*kw)).count()
}
