//! Word-level sentiment lexicon.
//!
//! Each entry is `(word, polarity, subjectivity)`. Polarity is in [-1, 1],
//! subjectivity in [0, 1]. Values follow the usual adjective-lexicon
//! conventions for English news text. Inflected forms that are not listed
//! fall back to their base form (`attacked` scores as `attack`).

use std::collections::HashMap;

use lazy_static::lazy_static;

const WORDS: &[(&str, f64, f64)] = &[
    // positive
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("wonderful", 1.0, 1.0),
    ("fantastic", 0.4, 0.9),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("positive", 0.23, 0.55),
    ("happy", 0.8, 1.0),
    ("glad", 0.5, 1.0),
    ("pleased", 0.5, 1.0),
    ("successful", 0.75, 0.95),
    ("success", 0.3, 0.4),
    ("strong", 0.43, 0.73),
    ("hopeful", 0.6, 0.8),
    ("optimistic", 0.5, 0.6),
    ("peaceful", 0.5, 0.75),
    ("safe", 0.5, 0.5),
    ("secure", 0.4, 0.6),
    ("beautiful", 0.85, 1.0),
    ("brilliant", 0.9, 1.0),
    ("impressive", 1.0, 1.0),
    ("remarkable", 0.75, 0.75),
    ("encouraging", 0.5, 0.7),
    ("welcome", 0.8, 0.9),
    ("improved", 0.4, 0.5),
    ("recovery", 0.2, 0.3),
    ("win", 0.8, 0.4),
    ("wins", 0.8, 0.4),
    ("won", 0.6, 0.4),
    ("victory", 0.6, 0.5),
    ("celebrate", 0.5, 0.6),
    ("celebrated", 0.5, 0.6),
    ("love", 0.5, 0.6),
    ("loved", 0.7, 0.8),
    ("nice", 0.6, 1.0),
    ("fine", 0.42, 0.5),
    ("calm", 0.3, 0.75),
    ("fair", 0.7, 0.9),
    ("important", 0.4, 1.0),
    ("significant", 0.38, 0.88),
    ("major", 0.06, 0.5),
    ("free", 0.4, 0.8),
    ("easy", 0.43, 0.83),
    ("helpful", 0.5, 0.5),
    ("kind", 0.6, 0.9),
    ("generous", 0.5, 0.7),
    ("healthy", 0.5, 0.5),
    ("record", 0.1, 0.2),
    ("rise", 0.1, 0.2),
    ("growth", 0.2, 0.3),
    ("boost", 0.4, 0.4),
    ("breakthrough", 0.5, 0.5),
    ("praised", 0.6, 0.7),
    ("thrilled", 0.7, 0.9),
    ("exciting", 0.3, 0.8),
    ("historic", 0.2, 0.4),
    // positive, news vocabulary
    ("praise", 0.6, 0.7),
    ("hope", 0.4, 0.6),
    ("hopes", 0.4, 0.6),
    ("delighted", 0.8, 0.9),
    ("proud", 0.7, 0.9),
    ("joy", 0.8, 0.9),
    ("relief", 0.4, 0.5),
    ("relieved", 0.5, 0.7),
    ("grateful", 0.7, 0.9),
    ("thanks", 0.3, 0.4),
    ("support", 0.3, 0.3),
    ("supportive", 0.5, 0.6),
    ("rescue", 0.3, 0.3),
    ("rescued", 0.4, 0.4),
    ("recover", 0.3, 0.3),
    ("survive", 0.3, 0.3),
    ("survived", 0.3, 0.3),
    ("save", 0.3, 0.3),
    ("saved", 0.4, 0.3),
    ("protect", 0.3, 0.3),
    ("help", 0.3, 0.3),
    ("benefit", 0.4, 0.4),
    ("benefits", 0.4, 0.4),
    ("gain", 0.3, 0.3),
    ("gains", 0.3, 0.3),
    ("improve", 0.4, 0.4),
    ("improvement", 0.4, 0.4),
    ("progress", 0.4, 0.4),
    ("achieve", 0.5, 0.5),
    ("achievement", 0.6, 0.6),
    ("award", 0.5, 0.4),
    ("honour", 0.5, 0.5),
    ("honoured", 0.6, 0.7),
    ("champion", 0.5, 0.5),
    ("champions", 0.5, 0.5),
    ("triumph", 0.7, 0.7),
    ("agreement", 0.3, 0.3),
    ("deal", 0.1, 0.2),
    ("peace", 0.6, 0.5),
    ("unity", 0.5, 0.5),
    ("stable", 0.3, 0.4),
    ("stability", 0.3, 0.4),
    ("confident", 0.5, 0.7),
    ("confidence", 0.4, 0.6),
    ("trust", 0.4, 0.5),
    ("innovative", 0.5, 0.6),
    ("creative", 0.5, 0.7),
    ("inspiring", 0.7, 0.8),
    ("inspired", 0.6, 0.7),
    ("talented", 0.6, 0.7),
    ("popular", 0.5, 0.6),
    ("favourite", 0.5, 0.8),
    ("favorite", 0.5, 0.8),
    ("enjoy", 0.5, 0.6),
    ("enjoyed", 0.5, 0.6),
    ("fun", 0.6, 0.8),
    ("perfect", 1.0, 1.0),
    ("superb", 1.0, 1.0),
    ("outstanding", 0.8, 0.9),
    ("exceptional", 0.7, 0.8),
    ("incredible", 0.6, 0.9),
    ("extraordinary", 0.5, 0.8),
    ("magnificent", 1.0, 1.0),
    ("splendid", 0.8, 0.9),
    ("lovely", 0.7, 0.9),
    ("delightful", 0.8, 1.0),
    ("pleasant", 0.6, 0.8),
    ("warm", 0.4, 0.6),
    ("friendly", 0.5, 0.6),
    ("clean", 0.3, 0.4),
    ("bright", 0.5, 0.6),
    ("smart", 0.4, 0.6),
    ("wise", 0.5, 0.7),
    ("effective", 0.5, 0.6),
    ("efficient", 0.4, 0.5),
    ("reliable", 0.5, 0.6),
    ("affordable", 0.3, 0.4),
    ("valuable", 0.5, 0.6),
    ("useful", 0.4, 0.4),
    ("favourable", 0.5, 0.6),
    ("promising", 0.5, 0.6),
    ("prosper", 0.5, 0.5),
    ("prosperity", 0.5, 0.5),
    ("thrive", 0.6, 0.6),
    ("thriving", 0.6, 0.6),
    ("flourish", 0.6, 0.6),
    ("boom", 0.4, 0.4),
    ("surge", 0.2, 0.3),
    ("soar", 0.4, 0.4),
    ("reunited", 0.6, 0.7),
    ("reunion", 0.5, 0.6),
    ("cheer", 0.6, 0.7),
    ("cheers", 0.6, 0.7),
    ("applause", 0.5, 0.6),
    ("applauded", 0.6, 0.6),
    ("hailed", 0.5, 0.6),
    ("welcomed", 0.6, 0.6),
    ("heroic", 0.7, 0.8),
    ("hero", 0.6, 0.6),
    ("heroes", 0.6, 0.6),
    ("brave", 0.6, 0.8),
    ("courage", 0.5, 0.6),
    ("courageous", 0.6, 0.8),
    ("compassion", 0.5, 0.6),
    ("charity", 0.3, 0.3),
    ("donation", 0.3, 0.3),
    ("volunteer", 0.3, 0.3),
    ("volunteers", 0.3, 0.3),
    ("cure", 0.5, 0.4),
    ("healed", 0.5, 0.4),
    ("upbeat", 0.5, 0.7),
    ("excited", 0.5, 0.8),
    ("thankful", 0.6, 0.8),
    ("optimism", 0.5, 0.6),
    ("ease", 0.2, 0.3),
    ("eased", 0.2, 0.3),
    ("freedom", 0.4, 0.5),
    ("justice", 0.3, 0.4),
    ("honest", 0.6, 0.8),
    ("innocent", 0.3, 0.5),
    ("acquitted", 0.3, 0.4),
    ("approve", 0.3, 0.4),
    ("approved", 0.3, 0.3),
    ("succeed", 0.5, 0.5),
    ("restored", 0.3, 0.3),
    // negative
    ("bad", -0.7, 0.67),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("horrible", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("sad", -0.5, 1.0),
    ("angry", -0.5, 1.0),
    ("afraid", -0.6, 0.9),
    ("fear", -0.3, 0.6),
    ("fears", -0.3, 0.6),
    ("worried", -0.4, 0.7),
    ("worry", -0.4, 0.6),
    ("concern", -0.2, 0.4),
    ("concerns", -0.2, 0.4),
    ("dangerous", -0.6, 0.9),
    ("deadly", -0.2, 0.6),
    ("dead", -0.2, 0.4),
    ("killed", -0.2, 0.2),
    ("death", -0.3, 0.4),
    ("violent", -0.8, 0.9),
    ("violence", -0.6, 0.7),
    ("attack", -0.4, 0.4),
    ("war", -0.4, 0.4),
    ("crisis", -0.5, 0.5),
    ("disaster", -0.7, 0.7),
    ("tragic", -0.75, 1.0),
    ("tragedy", -0.7, 0.8),
    ("crash", -0.5, 0.4),
    ("collapse", -0.5, 0.4),
    ("failed", -0.5, 0.3),
    ("failure", -0.32, 0.3),
    ("fail", -0.5, 0.3),
    ("loss", -0.3, 0.3),
    ("losses", -0.3, 0.3),
    ("lost", -0.3, 0.3),
    ("decline", -0.3, 0.3),
    ("fall", -0.2, 0.2),
    ("weak", -0.38, 0.63),
    ("difficult", -0.5, 1.0),
    ("hard", -0.29, 0.54),
    ("serious", -0.33, 0.67),
    ("severe", -0.5, 0.7),
    ("wrong", -0.5, 0.9),
    ("illegal", -0.5, 0.5),
    ("corrupt", -0.6, 0.7),
    ("unfair", -0.5, 0.9),
    ("painful", -0.7, 0.9),
    ("shocking", -1.0, 1.0),
    ("devastating", -0.8, 0.9),
    ("alarming", -0.6, 0.8),
    ("grim", -0.6, 0.8),
    ("hostile", -0.5, 0.6),
    ("chaos", -0.5, 0.6),
    ("scandal", -0.5, 0.6),
    ("criticised", -0.4, 0.5),
    ("criticized", -0.4, 0.5),
    ("protest", -0.2, 0.3),
    ("threat", -0.4, 0.5),
    ("warning", -0.2, 0.3),
    ("risk", -0.2, 0.4),
    ("sick", -0.7, 0.9),
    ("ill", -0.5, 0.8),
    ("guilty", -0.5, 0.6),
    ("disappointing", -0.6, 0.7),
    ("disappointed", -0.75, 0.75),
    ("unhappy", -0.6, 0.9),
    ("dire", -0.7, 0.8),
    // negative, news vocabulary
    ("damage", -0.4, 0.4),
    ("damaged", -0.4, 0.4),
    ("destroyed", -0.6, 0.5),
    ("destruction", -0.6, 0.5),
    ("storm", -0.2, 0.3),
    ("flood", -0.4, 0.4),
    ("floods", -0.4, 0.4),
    ("fire", -0.2, 0.3),
    ("blaze", -0.3, 0.3),
    ("explosion", -0.5, 0.4),
    ("blast", -0.4, 0.4),
    ("injured", -0.5, 0.4),
    ("injury", -0.4, 0.4),
    ("injuries", -0.4, 0.4),
    ("hurt", -0.5, 0.6),
    ("wounded", -0.5, 0.5),
    ("victim", -0.4, 0.4),
    ("victims", -0.4, 0.4),
    ("suffer", -0.5, 0.5),
    ("suffering", -0.6, 0.6),
    ("pain", -0.5, 0.6),
    ("grief", -0.7, 0.8),
    ("mourn", -0.6, 0.7),
    ("mourning", -0.6, 0.7),
    ("funeral", -0.3, 0.4),
    ("die", -0.4, 0.4),
    ("died", -0.4, 0.3),
    ("dying", -0.5, 0.4),
    ("kill", -0.5, 0.4),
    ("murder", -0.8, 0.6),
    ("murdered", -0.8, 0.6),
    ("shooting", -0.6, 0.5),
    ("stabbing", -0.7, 0.5),
    ("stabbed", -0.7, 0.5),
    ("assault", -0.6, 0.5),
    ("abuse", -0.7, 0.7),
    ("abused", -0.7, 0.7),
    ("rape", -0.9, 0.7),
    ("terror", -0.8, 0.7),
    ("terrorist", -0.8, 0.7),
    ("terrorism", -0.8, 0.7),
    ("bomb", -0.6, 0.4),
    ("bombing", -0.7, 0.5),
    ("conflict", -0.4, 0.4),
    ("fighting", -0.4, 0.4),
    ("clash", -0.4, 0.4),
    ("clashes", -0.4, 0.4),
    ("riot", -0.6, 0.5),
    ("unrest", -0.4, 0.4),
    ("invasion", -0.6, 0.5),
    ("hostage", -0.6, 0.5),
    ("kidnapped", -0.7, 0.6),
    ("missing", -0.3, 0.3),
    ("arrest", -0.3, 0.3),
    ("arrested", -0.3, 0.3),
    ("charged", -0.3, 0.3),
    ("jailed", -0.4, 0.3),
    ("prison", -0.3, 0.3),
    ("crime", -0.5, 0.4),
    ("criminal", -0.5, 0.5),
    ("fraud", -0.6, 0.5),
    ("theft", -0.5, 0.4),
    ("stolen", -0.5, 0.4),
    ("bribery", -0.6, 0.5),
    ("corruption", -0.6, 0.6),
    ("accused", -0.4, 0.4),
    ("allegations", -0.3, 0.4),
    ("alleged", -0.2, 0.3),
    ("lawsuit", -0.3, 0.3),
    ("ban", -0.3, 0.3),
    ("banned", -0.3, 0.3),
    ("fined", -0.4, 0.3),
    ("fines", -0.3, 0.3),
    ("penalty", -0.3, 0.3),
    ("sanctions", -0.3, 0.3),
    ("blame", -0.4, 0.5),
    ("blamed", -0.4, 0.5),
    ("condemn", -0.5, 0.6),
    ("condemned", -0.5, 0.6),
    ("outrage", -0.7, 0.8),
    ("furious", -0.8, 0.9),
    ("anger", -0.6, 0.7),
    ("fury", -0.7, 0.8),
    ("upset", -0.5, 0.7),
    ("frustrated", -0.5, 0.7),
    ("frustration", -0.5, 0.7),
    ("anxious", -0.5, 0.8),
    ("anxiety", -0.5, 0.7),
    ("stress", -0.4, 0.6),
    ("distress", -0.6, 0.7),
    ("panic", -0.6, 0.7),
    ("shock", -0.5, 0.6),
    ("shocked", -0.6, 0.7),
    ("horror", -0.8, 0.8),
    ("horrific", -0.9, 0.9),
    ("appalling", -0.9, 0.9),
    ("disgraceful", -0.8, 0.9),
    ("shameful", -0.7, 0.9),
    ("shame", -0.5, 0.7),
    ("embarrassing", -0.5, 0.8),
    ("ugly", -0.6, 0.8),
    ("nasty", -0.7, 0.9),
    ("cruel", -0.8, 0.9),
    ("brutal", -0.8, 0.8),
    ("toxic", -0.6, 0.6),
    ("harmful", -0.5, 0.6),
    ("harm", -0.5, 0.5),
    ("unsafe", -0.5, 0.6),
    ("threatened", -0.4, 0.5),
    ("danger", -0.5, 0.5),
    ("emergency", -0.4, 0.4),
    ("catastrophe", -0.8, 0.8),
    ("catastrophic", -0.8, 0.8),
    ("drought", -0.4, 0.4),
    ("famine", -0.7, 0.6),
    ("poverty", -0.5, 0.5),
    ("hunger", -0.5, 0.5),
    ("homeless", -0.5, 0.5),
    ("debt", -0.3, 0.3),
    ("deficit", -0.3, 0.3),
    ("recession", -0.5, 0.4),
    ("inflation", -0.2, 0.3),
    ("slump", -0.4, 0.4),
    ("plunge", -0.4, 0.4),
    ("plunged", -0.4, 0.4),
    ("tumble", -0.3, 0.3),
    ("cut", -0.2, 0.2),
    ("cuts", -0.2, 0.2),
    ("layoffs", -0.5, 0.4),
    ("redundancies", -0.4, 0.4),
    ("unemployment", -0.4, 0.4),
    ("bankrupt", -0.6, 0.5),
    ("bankruptcy", -0.6, 0.5),
    ("closure", -0.3, 0.3),
    ("shortage", -0.4, 0.4),
    ("shortages", -0.4, 0.4),
    ("delay", -0.3, 0.3),
    ("delays", -0.3, 0.3),
    ("disruption", -0.4, 0.4),
    ("strike", -0.2, 0.3),
    ("strikes", -0.2, 0.3),
    ("dispute", -0.3, 0.4),
    ("row", -0.2, 0.3),
    ("controversy", -0.4, 0.5),
    ("controversial", -0.3, 0.6),
    ("problem", -0.3, 0.4),
    ("problems", -0.3, 0.4),
    ("trouble", -0.4, 0.5),
    ("struggle", -0.4, 0.5),
    ("struggling", -0.4, 0.5),
    ("vulnerable", -0.3, 0.5),
    ("disease", -0.4, 0.4),
    ("virus", -0.3, 0.3),
    ("outbreak", -0.5, 0.4),
    ("pandemic", -0.4, 0.4),
    ("infection", -0.4, 0.4),
    ("cancer", -0.5, 0.4),
    ("pollution", -0.5, 0.5),
    ("accident", -0.4, 0.4),
    ("collision", -0.4, 0.4),
    ("lose", -0.4, 0.3),
    ("defeat", -0.5, 0.4),
    ("defeated", -0.5, 0.4),
    ("miss", -0.2, 0.3),
    ("mistake", -0.4, 0.5),
    ("error", -0.3, 0.4),
    ("flawed", -0.5, 0.6),
    ("broken", -0.4, 0.4),
    ("useless", -0.7, 0.8),
    ("pointless", -0.6, 0.8),
    ("reckless", -0.6, 0.7),
    ("negligent", -0.6, 0.7),
    ("incompetent", -0.7, 0.8),
    ("weakness", -0.4, 0.5),
    ("negative", -0.3, 0.6),
    ("pessimistic", -0.5, 0.7),
    ("gloomy", -0.6, 0.8),
    ("bleak", -0.6, 0.7),
    ("lonely", -0.5, 0.8),
    ("miserable", -0.8, 1.0),
    ("unpleasant", -0.6, 0.8),
    ("annoying", -0.6, 0.9),
    ("boring", -0.6, 0.9),
    ("hate", -0.8, 0.9),
    ("hatred", -0.8, 0.8),
    ("racist", -0.8, 0.8),
    ("racism", -0.8, 0.8),
    ("discrimination", -0.6, 0.6),
    ("bullying", -0.7, 0.7),
    ("harassment", -0.7, 0.7),
    ("warn", -0.2, 0.3),
    ("warned", -0.3, 0.3),
    ("threaten", -0.4, 0.5),
    ("evacuated", -0.4, 0.4),
    ("collapsed", -0.5, 0.4),
    ("fled", -0.4, 0.4),
    ("refugees", -0.2, 0.3),
    ("casualties", -0.6, 0.5),
    ("fatal", -0.7, 0.6),
    ("tragically", -0.75, 1.0),
    ("condemnation", -0.5, 0.6),
    ("resign", -0.3, 0.4),
    ("resigned", -0.3, 0.4),
    ("sacked", -0.4, 0.4),
    ("scrapped", -0.3, 0.3),
    ("rejected", -0.3, 0.4),
    ("denied", -0.2, 0.3),
];

/// Words that scale the next sentiment word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("highly", 1.3),
    ("so", 1.2),
    ("too", 1.2),
    ("deeply", 1.4),
    ("truly", 1.3),
    ("most", 1.2),
    ("slightly", 0.5),
    ("somewhat", 0.6),
    ("fairly", 0.8),
    ("barely", 0.4),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "nor", "neither", "without", "hardly", "cannot"];

lazy_static! {
    static ref LEXICON: HashMap<&'static str, (f64, f64)> =
        WORDS.iter().map(|&(word, p, s)| (word, (p, s))).collect();
    static ref INTENSITY: HashMap<&'static str, f64> = INTENSIFIERS.iter().copied().collect();
}

/// Shortest stem an inflection may be stripped down to.
const MIN_STEM: usize = 3;

pub fn lookup(word: &str) -> Option<(f64, f64)> {
    if let Some(entry) = LEXICON.get(word) {
        return Some(*entry);
    }
    // "hardly" is not "hard", "really" is not "real".
    if is_negation(word) || INTENSITY.contains_key(word) {
        return None;
    }
    base_forms(word)
        .iter()
        .find_map(|base| LEXICON.get(base.as_str()).copied())
}

/// Candidate base forms of an inflected word, in the order they are tried.
fn base_forms(word: &str) -> Vec<String> {
    let mut forms = Vec::new();
    let mut push = |stem: &str, tail: &str| {
        if stem.len() >= MIN_STEM {
            forms.push(format!("{}{}", stem, tail));
        }
    };

    if let Some(stem) = word.strip_suffix("ies") {
        push(stem, "y");
    }
    if let Some(stem) = word.strip_suffix("es") {
        push(stem, "");
    }
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.ends_with('s') {
            push(stem, "");
        }
    }
    if let Some(stem) = word.strip_suffix("ied") {
        push(stem, "y");
    }
    for suffix in ["ed", "ing"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            push(stem, "");
            push(stem, "e");
            push(undouble(stem), "");
        }
    }
    if let Some(stem) = word.strip_suffix("ily") {
        push(stem, "y");
    }
    if let Some(stem) = word.strip_suffix("ly") {
        push(stem, "");
    }
    forms
}

/// `stopp` -> `stop`, `winn` -> `win`.
fn undouble(stem: &str) -> &str {
    let mut chars = stem.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if a == b && !"aeiou".contains(a) => &stem[..stem.len() - a.len_utf8()],
        _ => stem,
    }
}

pub fn intensity(word: &str) -> Option<f64> {
    INTENSITY.get(word).copied()
}

pub fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}
