// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

use super::erreurs::ParseError;
use super::expr::Relation;
use super::liste_blanche::{decoupe, resoudre, Fonction, Nom};

/// Exposant décimal max accepté dans un littéral (1e4096).
const EXPOSANT_DECIMAL_MAX: i64 = 4096;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Pi,
    E,
    Booleen(bool),

    // La variable désignée (seul identifiant libre construit)
    Var(String),
    Fonction(Fonction),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^ ou **

    LPar,
    RPar,
    Virgule,

    Rel(Relation),
    Et,
    Ou,

    // Produits par le shunting-yard (jamais par tokenize)
    Neg,
    Appel(Fonction, usize),
    Tuple(usize),
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - entiers, décimaux (2.5), notation scientifique (1e-3) -> rationnels exacts
/// - opérateurs + - * / ^ ** et relations < <= > >= == != ≤ ≥ ≠, & |
/// - parenthèses ( ) et virgules
/// - π ou pi, e, true/false
/// - identifiants [a-zA-Z][a-zA-Z0-9_]* (normalisés en minuscules), résolus par la liste blanche
/// - √ (équivaut à sqrt)
pub fn tokenize(s: &str, variable: &str) -> Result<Vec<Tok>, ParseError> {
    // Marqueurs de syntaxe restreinte : refusés avant toute lecture.
    for interdit in ["__", ";"] {
        if s.contains(interdit) {
            return Err(ParseError::SyntaxeInterdite(interdit.to_string()));
        }
    }

    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];
        let suivant = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Ponctuation et opérateurs (1 ou 2 caractères)
        let (tok, largeur) = match (c, suivant) {
            ('(', _) => (Some(Tok::LPar), 1),
            (')', _) => (Some(Tok::RPar), 1),
            (',', _) => (Some(Tok::Virgule), 1),
            ('+', _) => (Some(Tok::Plus), 1),
            ('-', _) => (Some(Tok::Minus), 1),
            ('*', Some('*')) => (Some(Tok::Caret), 2),
            ('*', _) => (Some(Tok::Star), 1),
            ('/', _) => (Some(Tok::Slash), 1),
            ('^', _) => (Some(Tok::Caret), 1),
            ('<', Some('=')) => (Some(Tok::Rel(Relation::Le)), 2),
            ('<', _) => (Some(Tok::Rel(Relation::Lt)), 1),
            ('>', Some('=')) => (Some(Tok::Rel(Relation::Ge)), 2),
            ('>', _) => (Some(Tok::Rel(Relation::Gt)), 1),
            ('=', Some('=')) => (Some(Tok::Rel(Relation::Eq)), 2),
            ('!', Some('=')) => (Some(Tok::Rel(Relation::Ne)), 2),
            ('≤', _) => (Some(Tok::Rel(Relation::Le)), 1),
            ('≥', _) => (Some(Tok::Rel(Relation::Ge)), 1),
            ('≠', _) => (Some(Tok::Rel(Relation::Ne)), 1),
            ('&', _) => (Some(Tok::Et), 1),
            ('|', _) => (Some(Tok::Ou), 1),
            ('π', _) => (Some(Tok::Pi), 1),
            // Racine carrée unicode : √  => sqrt
            ('√', _) => (Some(Tok::Fonction(Fonction::Sqrt)), 1),
            _ => (None, 0),
        };
        if let Some(t) = tok {
            out.push(t);
            i += largeur;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let w = word.to_lowercase();

            if let Some(nom) = resoudre(&w, variable) {
                out.push(jeton_de_nom(nom, &w));
                continue;
            }

            // Mot inconnu : découpage glouton en noms connus ("xsin" -> x sin)
            if let Some(pieces) = decoupe(&w, variable) {
                out.extend(pieces.iter().map(|(n, nom)| jeton_de_nom(*nom, n)));
                continue;
            }

            let appel = chars[i..].iter().find(|c| !c.is_whitespace()) == Some(&'(');
            return Err(if appel {
                ParseError::FonctionInconnue(w)
            } else {
                ParseError::VariableNonPermise {
                    trouve: w,
                    attendue: variable.to_string(),
                }
            });
        }

        // Nombre : 12, 2.5, .5, 1e-3, 6.02E23
        if c.is_ascii_digit() || (c == '.' && suivant.is_some_and(|d| d.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            // exposant seulement s’il est suivi de chiffres (sinon "2e" = 2·e)
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }

            let texte: String = chars[start..i].iter().collect();
            let r = rationnel_depuis_decimal(&texte).ok_or(ParseError::NombreInvalide(texte))?;
            out.push(Tok::Num(r));
            continue;
        }

        return Err(ParseError::CaractereInattendu(c));
    }

    Ok(out)
}

fn jeton_de_nom(nom: Nom, texte: &str) -> Tok {
    match nom {
        Nom::Fonction(f) => Tok::Fonction(f),
        Nom::Pi => Tok::Pi,
        Nom::E => Tok::E,
        Nom::Vrai => Tok::Booleen(true),
        Nom::Faux => Tok::Booleen(false),
        Nom::Variable => Tok::Var(texte.to_string()),
    }
}

/// Littéral décimal -> rationnel exact ("2.5" -> 5/2, "1e-3" -> 1/1000).
/// None si la forme est invalide ou l’exposant démesuré.
pub fn rationnel_depuis_decimal(s: &str) -> Option<BigRational> {
    let s = s.trim();
    let (mantisse, exposant) = match s.find(|c| c == 'e' || c == 'E') {
        Some(k) => (&s[..k], s[k + 1..].parse::<i64>().ok()?),
        None => (s, 0),
    };
    if exposant.abs() > EXPOSANT_DECIMAL_MAX {
        return None;
    }

    let (negatif, mantisse) = match mantisse.strip_prefix('-') {
        Some(m) => (true, m),
        None => (false, mantisse.strip_prefix('+').unwrap_or(mantisse)),
    };
    let (entier, fraction) = match mantisse.split_once('.') {
        Some((a, b)) => (a, b),
        None => (mantisse, ""),
    };
    if entier.is_empty() && fraction.is_empty() {
        return None;
    }
    if !entier.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let chiffres = format!("{entier}{fraction}");
    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
    let echelle = exposant - fraction.len() as i64;

    let dix = BigInt::from(10);
    let puissance = num_traits::pow(dix, echelle.unsigned_abs() as usize);
    let mut r = if echelle >= 0 {
        BigRational::from_integer(n * puissance)
    } else {
        BigRational::new(n, puissance)
    };
    if negatif {
        r = -r;
    }
    Some(r)
}

/// Multiplication implicite : insère `*` entre une fin de valeur
/// (nombre, constante, variable, `)`) et un début de valeur
/// (nombre, constante, nom, `(`). "2x" -> 2*x, "(x+1)(x-1)", "x sin(x)".
pub fn insere_multiplications(jetons: Vec<Tok>) -> Vec<Tok> {
    fn termine_valeur(t: &Tok) -> bool {
        matches!(t, Tok::Num(_) | Tok::Pi | Tok::E | Tok::Var(_) | Tok::RPar)
    }
    fn commence_valeur(t: &Tok) -> bool {
        matches!(
            t,
            Tok::Num(_) | Tok::Pi | Tok::E | Tok::Var(_) | Tok::Fonction(_) | Tok::LPar
        )
    }

    let mut out: Vec<Tok> = Vec::with_capacity(jetons.len() * 2);
    for t in jetons {
        if let Some(prev) = out.last() {
            if termine_valeur(prev) && commence_valeur(&t) {
                out.push(Tok::Star);
            }
        }
        out.push(t);
    }
    out
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        let n = r.numer();
        let d = r.denom();
        if d.is_one() {
            format!("{n}")
        } else {
            format!("{n}/{d}")
        }
    }

    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rat(r),
            Tok::Pi => "π".to_string(),
            Tok::E => "e".to_string(),
            Tok::Booleen(b) => b.to_string(),
            Tok::Var(name) => name.clone(),
            Tok::Fonction(f) => f.nom().to_string(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Virgule => ",".to_string(),

            Tok::Rel(r) => r.symbole().to_string(),
            Tok::Et => "&".to_string(),
            Tok::Ou => "|".to_string(),

            Tok::Neg => "neg".to_string(),
            Tok::Appel(f, n) => format!("{}/{n}", f.nom()),
            Tok::Tuple(n) => format!("tuple/{n}"),
        };
        out.push(s);
    }
    out.join(" ")
}
