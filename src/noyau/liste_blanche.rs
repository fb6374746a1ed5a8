// src/noyau/liste_blanche.rs
//
// Table statique des noms autorisés.
// Rien n’est résolu dynamiquement : un nom absent de la table (et différent
// de la variable) est refusé par le tokenizer.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fonction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
    Sqrt,
    Exp,
    Abs,
    Piecewise,
}

impl Fonction {
    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Asin => "asin",
            Fonction::Acos => "acos",
            Fonction::Atan => "atan",
            Fonction::Log => "log",
            Fonction::Sqrt => "sqrt",
            Fonction::Exp => "exp",
            Fonction::Abs => "abs",
            Fonction::Piecewise => "piecewise",
        }
    }

    /// log(a) ou log(a, base) ; Piecewise(au moins une branche) ; le reste unaire.
    pub fn arite_valide(self, n: usize) -> bool {
        match self {
            Fonction::Log => n == 1 || n == 2,
            Fonction::Piecewise => n >= 1,
            _ => n == 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nom {
    Fonction(Fonction),
    Pi,
    E,
    Vrai,
    Faux,
    Variable,
}

const NOMS: &[(&str, Nom)] = &[
    ("sin", Nom::Fonction(Fonction::Sin)),
    ("cos", Nom::Fonction(Fonction::Cos)),
    ("tan", Nom::Fonction(Fonction::Tan)),
    ("asin", Nom::Fonction(Fonction::Asin)),
    ("acos", Nom::Fonction(Fonction::Acos)),
    ("atan", Nom::Fonction(Fonction::Atan)),
    ("log", Nom::Fonction(Fonction::Log)),
    ("sqrt", Nom::Fonction(Fonction::Sqrt)),
    ("exp", Nom::Fonction(Fonction::Exp)),
    ("abs", Nom::Fonction(Fonction::Abs)),
    ("piecewise", Nom::Fonction(Fonction::Piecewise)),
    ("pi", Nom::Pi),
    ("e", Nom::E),
    ("true", Nom::Vrai),
    ("false", Nom::Faux),
];

/// Longueur max d’un mot soumis au découpage glouton.
const MOT_MAX: usize = 64;

/// Nom (déjà en minuscules) -> entrée de la table. La variable est prioritaire.
pub fn resoudre(nom: &str, variable: &str) -> Option<Nom> {
    if nom == variable {
        return Some(Nom::Variable);
    }
    NOMS.iter().find(|(n, _)| *n == nom).map(|(_, v)| *v)
}

/// Le nom est-il réservé (donc inutilisable comme variable) ?
pub fn est_reserve(nom: &str) -> bool {
    NOMS.iter().any(|(n, _)| *n == nom)
}

/// Découpe glouton d’un mot inconnu en noms connus : "xsin" -> [x, sin].
/// Plus long préfixe d’abord, avec retour arrière. None si impossible.
pub fn decoupe(mot: &str, variable: &str) -> Option<Vec<(String, Nom)>> {
    if mot.len() > MOT_MAX {
        return None;
    }
    decoupe_rec(mot, variable)
}

fn decoupe_rec(mot: &str, variable: &str) -> Option<Vec<(String, Nom)>> {
    if mot.is_empty() {
        return Some(Vec::new());
    }

    let mut prefixes: Vec<&str> = NOMS
        .iter()
        .map(|(n, _)| *n)
        .chain(std::iter::once(variable))
        .filter(|n| !n.is_empty() && mot.starts_with(n))
        .collect();
    prefixes.sort_by_key(|n| std::cmp::Reverse(n.len()));

    for p in prefixes {
        if let Some(mut reste) = decoupe_rec(&mot[p.len()..], variable) {
            let nom = resoudre(p, variable)?;
            reste.insert(0, (p.to_string(), nom));
            return Some(reste);
        }
    }
    None
}
