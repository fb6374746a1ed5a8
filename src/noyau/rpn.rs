// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire Expr
//
// Règles:
// - Fonction(f): doit être suivie de '(' ; ses arguments sont comptés
//   (virgules) et elle sort en RPN sous la forme Appel(f, n).
// - Parenthèses à plusieurs éléments (a, b) => Tuple(n) (branches Piecewise).
// - Moins unaire => Neg (préfixe), plus serré que * et plus lâche que ^ :
//   "-x^2" = -(x^2), "2*-x" = 2*(-x).
// - Plus unaire : ignoré.
// - Imbrication bornée : PARENTHESES_MAX niveaux de '(' et un arbre
//   d'au plus PROFONDEUR_MAX niveaux.

use num_traits::{One, ToPrimitive};

use super::erreurs::ParseError;
use super::expr::{Condition, Expr};
use super::jetons::Tok;
use super::liste_blanche::Fonction;

/// Niveaux de parenthèses (appels compris) ouverts en même temps.
const PARENTHESES_MAX: usize = 256;

/// Profondeur maximale de l'arbre reconstruit.
const PROFONDEUR_MAX: usize = 512;

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Ou => 1,
        Tok::Et => 2,
        Tok::Rel(_) => 3,
        Tok::Plus | Tok::Minus => 4,
        Tok::Star | Tok::Slash => 5,
        Tok::Neg => 6,
        Tok::Caret => 7,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret | Tok::Neg)
}

fn est_binaire(t: &Tok) -> bool {
    matches!(
        t,
        Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret | Tok::Rel(_) | Tok::Et | Tok::Ou
    )
}

fn structure(msg: impl Into<String>) -> ParseError {
    ParseError::Structure(msg.into())
}

/// Une parenthèse ouverte : appel de fonction ou groupement.
struct Cadre {
    fonction: Option<Fonction>,
    virgules: usize,
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Fonction(Sin), LPar, Pi, Slash, Num(2), RPar]
///   rpn:    [Pi, Num(2), Slash, Appel(Sin, 1)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, ParseError> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();
    let mut cadres: Vec<Cadre> = Vec::new();

    // true tant qu’un opérande est attendu (début, après opérateur, '(' ou ',').
    let mut attend_valeur = true;
    let mut fonction_en_attente: Option<Fonction> = None;

    for (k, tok) in tokens.iter().enumerate() {
        match tok {
            Tok::Num(_) | Tok::Pi | Tok::E | Tok::Var(_) | Tok::Booleen(_) => {
                if !attend_valeur {
                    return Err(structure("deux valeurs sans opérateur"));
                }
                out.push(tok.clone());
                attend_valeur = false;
            }

            Tok::Fonction(f) => {
                if !attend_valeur {
                    return Err(structure("fonction mal placée"));
                }
                if tokens.get(k + 1) != Some(&Tok::LPar) {
                    return Err(structure(format!("{} doit être suivi de '('", f.nom())));
                }
                fonction_en_attente = Some(*f);
            }

            Tok::LPar => {
                if !attend_valeur {
                    return Err(structure("parenthèse mal placée"));
                }
                if cadres.len() >= PARENTHESES_MAX {
                    return Err(structure(format!(
                        "imbrication trop profonde (max {PARENTHESES_MAX} parenthèses)"
                    )));
                }
                ops.push(Tok::LPar);
                cadres.push(Cadre {
                    fonction: fonction_en_attente.take(),
                    virgules: 0,
                });
                attend_valeur = true;
            }

            Tok::Virgule => {
                if attend_valeur {
                    return Err(structure("argument manquant avant ','"));
                }
                depile_jusqu_a_parenthese(&mut ops, &mut out)?;
                let cadre = cadres
                    .last_mut()
                    .ok_or_else(|| structure("virgule hors d’une parenthèse"))?;
                cadre.virgules += 1;
                attend_valeur = true;
            }

            Tok::RPar => {
                if attend_valeur {
                    return Err(structure("opérande manquante avant ')'"));
                }
                depile_jusqu_a_parenthese(&mut ops, &mut out)?;
                // retire la '(' elle-même
                ops.pop();
                let cadre = cadres
                    .pop()
                    .ok_or_else(|| structure("parenthèse fermante en trop"))?;
                let n = cadre.virgules + 1;
                match cadre.fonction {
                    Some(f) => {
                        if !f.arite_valide(n) {
                            return Err(structure(format!(
                                "{} ne prend pas {n} argument(s)",
                                f.nom()
                            )));
                        }
                        out.push(Tok::Appel(f, n));
                    }
                    None if n > 1 => out.push(Tok::Tuple(n)),
                    None => {}
                }
                attend_valeur = false;
            }

            Tok::Minus if attend_valeur => {
                // préfixe : ne dépile rien
                ops.push(Tok::Neg);
            }
            Tok::Plus if attend_valeur => {}

            t if est_binaire(t) => {
                if attend_valeur {
                    return Err(structure(format!(
                        "opérande manquante avant '{}'",
                        super::jetons::format_tokens(std::slice::from_ref(t))
                    )));
                }

                // dépile tant que:
                // - on n'est pas bloqué par '('
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(t);

                    let doit_pop = if is_right_associative(t) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(t.clone());
                attend_valeur = true;
            }

            _ => return Err(structure("jeton inattendu")),
        }
    }

    if attend_valeur {
        return Err(structure("expression incomplète"));
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err(structure("parenthèses non fermées"));
        }
        out.push(op);
    }

    Ok(out)
}

fn depile_jusqu_a_parenthese(ops: &mut Vec<Tok>, out: &mut Vec<Tok>) -> Result<(), ParseError> {
    loop {
        match ops.last() {
            None => return Err(structure("parenthèse fermante en trop")),
            Some(Tok::LPar) => return Ok(()),
            Some(_) => {
                if let Some(op) = ops.pop() {
                    out.push(op);
                }
            }
        }
    }
}

/* ------------------------ RPN -> AST ------------------------ */

/// Élément de la pile de reconstruction.
enum Noeud {
    Valeur(Expr),
    Cond(Condition),
    Tuple(Vec<Noeud>),
}

fn valeur(n: Noeud) -> Result<Expr, ParseError> {
    match n {
        Noeud::Valeur(e) => Ok(e),
        Noeud::Cond(_) => Err(structure("condition utilisée comme valeur")),
        Noeud::Tuple(_) => Err(structure("n-uplet utilisé comme valeur")),
    }
}

fn condition(n: Noeud) -> Result<Condition, ParseError> {
    match n {
        Noeud::Cond(c) => Ok(c),
        _ => Err(structure("condition attendue")),
    }
}

fn depile(st: &mut Vec<Noeud>, n: usize) -> Result<Vec<Noeud>, ParseError> {
    if st.len() < n {
        return Err(structure("expression invalide"));
    }
    Ok(st.split_off(st.len() - n))
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, ParseError> {
    let mut st: Vec<Noeud> = Vec::new();
    // profondeur de chaque élément de `st`
    let mut prof: Vec<usize> = Vec::new();

    for tok in rpn.iter().cloned() {
        let consommes = match &tok {
            Tok::Neg => 1,
            Tok::Tuple(n) | Tok::Appel(_, n) => *n,
            t if est_binaire(t) => 2,
            _ => 0,
        };
        let p = prof
            .split_off(prof.len().saturating_sub(consommes))
            .into_iter()
            .max()
            .map_or(1, |m| m + 1);
        if p > PROFONDEUR_MAX {
            return Err(structure(format!("expression trop profonde (max {PROFONDEUR_MAX} niveaux)")));
        }
        prof.push(p);

        match tok {
            Tok::Num(r) => st.push(Noeud::Valeur(Expr::Rat(r))),
            Tok::Pi => st.push(Noeud::Valeur(Expr::Pi)),
            Tok::E => st.push(Noeud::Valeur(Expr::E)),
            Tok::Var(name) => st.push(Noeud::Valeur(Expr::Var(name))),
            Tok::Booleen(b) => st.push(Noeud::Cond(if b { Condition::Vrai } else { Condition::Faux })),

            Tok::Neg => {
                let a = valeur(st.pop().ok_or_else(|| structure("opérande manquante"))?)?;
                st.push(Noeud::Valeur(Expr::neg(a)));
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                let mut ab = depile(&mut st, 2)?.into_iter();
                let (a, b) = match (ab.next(), ab.next()) {
                    (Some(a), Some(b)) => (valeur(a)?, valeur(b)?),
                    _ => return Err(structure("expression invalide")),
                };

                let e = match tok {
                    Tok::Plus => Expr::Add(a.boxed(), b.boxed()),
                    Tok::Minus => Expr::Sub(a.boxed(), b.boxed()),
                    Tok::Star => Expr::Mul(a.boxed(), b.boxed()),
                    Tok::Slash => Expr::Div(a.boxed(), b.boxed()),
                    _ => puissance(a, b),
                };
                st.push(Noeud::Valeur(e));
            }

            Tok::Rel(r) => {
                let mut ab = depile(&mut st, 2)?.into_iter();
                let (a, b) = match (ab.next(), ab.next()) {
                    (Some(a), Some(b)) => (valeur(a)?, valeur(b)?),
                    _ => return Err(structure("expression invalide")),
                };
                st.push(Noeud::Cond(Condition::Compare(a.boxed(), r, b.boxed())));
            }

            Tok::Et | Tok::Ou => {
                let mut ab = depile(&mut st, 2)?.into_iter();
                let (a, b) = match (ab.next(), ab.next()) {
                    (Some(a), Some(b)) => (condition(a)?, condition(b)?),
                    _ => return Err(structure("expression invalide")),
                };
                let c = if tok == Tok::Et {
                    Condition::Et(Box::new(a), Box::new(b))
                } else {
                    Condition::Ou(Box::new(a), Box::new(b))
                };
                st.push(Noeud::Cond(c));
            }

            Tok::Tuple(n) => {
                let elements = depile(&mut st, n)?;
                st.push(Noeud::Tuple(elements));
            }

            Tok::Appel(f, n) => {
                let args = depile(&mut st, n)?;
                st.push(Noeud::Valeur(appel(f, args)?));
            }

            Tok::Fonction(_) | Tok::LPar | Tok::RPar | Tok::Virgule => {
                return Err(structure("jeton inattendu en RPN"))
            }
        }
    }

    if st.len() != 1 {
        return Err(structure("expression invalide"));
    }
    match st.pop() {
        Some(Noeud::Valeur(e)) => Ok(e),
        Some(Noeud::Cond(_)) => Err(structure("une condition seule n’est pas une fonction")),
        _ => Err(structure("expression invalide")),
    }
}

/// Exposant rationnel entier (tenant dans i64) => PowInt, sinon Pow.
fn puissance(a: Expr, b: Expr) -> Expr {
    if let Expr::Rat(r) = &b {
        if r.denom().is_one() {
            if let Some(n) = r.numer().to_i64() {
                return Expr::PowInt(a.boxed(), n);
            }
        }
    }
    Expr::Pow(a.boxed(), b.boxed())
}

fn appel(f: Fonction, args: Vec<Noeud>) -> Result<Expr, ParseError> {
    if f == Fonction::Piecewise {
        let mut branches = Vec::with_capacity(args.len());
        for a in args {
            let Noeud::Tuple(paire) = a else {
                return Err(structure("Piecewise attend des paires (expression, condition)"));
            };
            let mut it = paire.into_iter();
            match (it.next(), it.next(), it.next()) {
                (Some(e), Some(c), None) => branches.push((valeur(e)?, condition(c)?)),
                _ => {
                    return Err(structure(
                        "Piecewise attend des paires (expression, condition)",
                    ))
                }
            }
        }
        return Ok(Expr::Piecewise(branches));
    }

    let mut vals = Vec::with_capacity(args.len());
    for a in args {
        vals.push(valeur(a)?);
    }
    let mut it = vals.into_iter();
    let x = it.next().ok_or_else(|| structure("fonction sans argument"))?.boxed();

    Ok(match f {
        Fonction::Sin => Expr::Sin(x),
        Fonction::Cos => Expr::Cos(x),
        Fonction::Tan => Expr::Tan(x),
        Fonction::Asin => Expr::Asin(x),
        Fonction::Acos => Expr::Acos(x),
        Fonction::Atan => Expr::Atan(x),
        Fonction::Sqrt => Expr::Sqrt(x),
        Fonction::Exp => Expr::Exp(x),
        Fonction::Abs => Expr::Abs(x),
        Fonction::Log => match it.next() {
            // log(a, b) = ln(a)/ln(b)
            Some(base) => Expr::Div(Expr::Ln(x).boxed(), Expr::Ln(base.boxed()).boxed()),
            None => Expr::Ln(x),
        },
        Fonction::Piecewise => return Err(structure("Piecewise")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::jetons::{format_tokens, insere_multiplications, tokenize};

    fn rpn(s: &str) -> Result<String, ParseError> {
        let t = insere_multiplications(tokenize(s, "x")?);
        Ok(format_tokens(&to_rpn(&t)?))
    }

    fn arbre(s: &str) -> Result<Expr, ParseError> {
        let t = insere_multiplications(tokenize(s, "x")?);
        from_rpn(&to_rpn(&t)?)
    }

    #[test]
    fn moins_unaire_et_puissance() {
        assert_eq!(rpn("-x^2").unwrap(), "x 2 ^ neg");
        assert_eq!(rpn("2*-x").unwrap(), "2 x neg *");
        assert_eq!(rpn("2^-x").unwrap(), "2 x neg ^");
        assert_eq!(rpn("2^3^2").unwrap(), "2 3 2 ^ ^");
    }

    #[test]
    fn appels_et_arites() {
        assert_eq!(rpn("log(x, 2)").unwrap(), "x 2 log/2");
        assert!(matches!(rpn("sin(x, 2)"), Err(ParseError::Structure(_))));
        assert!(matches!(rpn("sin x"), Err(ParseError::Structure(_))));
        assert!(matches!(rpn("sin()"), Err(ParseError::Structure(_))));
    }

    #[test]
    fn structures_invalides() {
        for s in ["(x+1", "x+1)", "x*", "*x", "x,1", "()", "x < 1"] {
            assert!(arbre(s).is_err(), "{s} devrait être refusé");
        }
    }

    #[test]
    fn imbrication_bornee() {
        let profond = format!("{}x{}", "sin(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(arbre(&profond), Err(ParseError::Structure(_))));

        let raisonnable = format!("{}x{}", "sin(".repeat(50), ")".repeat(50));
        assert!(arbre(&raisonnable).is_ok());

        // sans parenthèses : chaîne de moins unaires, somme très longue
        let negations = format!("{}x", "-".repeat(5_000));
        assert!(matches!(arbre(&negations), Err(ParseError::Structure(_))));
        let somme = vec!["x"; 5_000].join("+");
        assert!(matches!(arbre(&somme), Err(ParseError::Structure(_))));
        assert!(arbre(&vec!["x"; 200].join("+")).is_ok());
    }

    #[test]
    fn piecewise_reconstruit() {
        let e = arbre("Piecewise((x, x < 0), (x^2, True))").unwrap();
        let Expr::Piecewise(b) = e else {
            panic!("Piecewise attendu");
        };
        assert_eq!(b.len(), 2);
        assert_eq!(b[1].1, Condition::Vrai);
        assert_eq!(b[1].0, Expr::PowInt(Expr::Var("x".into()).boxed(), 2));
    }

    #[test]
    fn exposant_non_entier_reste_general() {
        let e = arbre("x^(1/2)").unwrap();
        assert!(matches!(e, Expr::Pow(_, _)));
        let e = arbre("x^0.5").unwrap();
        assert!(matches!(e, Expr::Pow(_, _)));
    }
}
