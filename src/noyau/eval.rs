//! Noyau — évaluation en un point, avec démarche
//!
//! f(x) -> substitution x = x0 (décimal exact) -> simplify -> trig spéciale
//!      -> re-simplify -> valeur exacte (si rationnelle) -> valeur finale
//!
//! La trig spéciale reste hors de l’AST : ses faits (`sin(π/6) = 1/2`)
//! sont recopiés dans la démarche.

use log::debug;

use super::erreurs::EvaluationError;
use super::expr::{Echec, Expr, Expression};
use super::jetons::rationnel_depuis_decimal;
use super::trig::applique_trig_speciale;

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub valeur: f64,
    /// Une ligne par étape, la dernière est toujours `valeur finale = …`.
    pub etapes: Vec<String>,
}

impl From<Echec> for EvaluationError {
    fn from(e: Echec) -> Self {
        match e {
            Echec::DivisionParZero => EvaluationError::DivisionParZero,
            Echec::NonReel(raison) => EvaluationError::NonReel(raison),
            Echec::Indetermine => EvaluationError::Indeterminee,
        }
    }
}

/// Évalue `expr` en `x0`. L’appartenance de x0 au domaine est vérifiée par l’appelant.
pub fn evaluate(expr: &Expression, x0: f64) -> Result<Evaluation, EvaluationError> {
    if !x0.is_finite() {
        return Err(EvaluationError::PointNonFini(format!("{x0}")));
    }
    let x0 = x0 + 0.0;

    // 1) Fonction, 2) substitution (plus courte écriture décimale de x0)
    let lu = format!("{x0}");
    let q = rationnel_depuis_decimal(&lu).ok_or_else(|| EvaluationError::PointNonFini(lu.clone()))?;
    let v = expr.variable();
    let substitue = expr.arbre().substituer(&Expr::Rat(q));

    let mut etapes = vec![
        expr.to_string(),
        format!("{v} = {lu}"),
        format!("f({lu}) = {substitue}"),
    ];

    // 3) Simplification exacte + trig spéciale
    let mut preuve = Vec::new();
    let s0 = substitue.clone().simplify();
    let s = applique_trig_speciale(&s0, &mut preuve).simplify();
    etapes.extend(preuve);
    if s != substitue {
        etapes.push(format!("= {s}"));
    }

    // 4) Valeur exacte si rationnelle
    if matches!(s, Expr::Indefini) {
        return Err(EvaluationError::Indeterminee);
    }
    if let Some(r) = s.comme_rat() {
        etapes.push(format!("valeur exacte = {r}"));
    }

    // 5) Valeur finale
    let valeur = s.evaluer_detail(x0)? + 0.0;
    etapes.push(format!("valeur finale = {valeur}"));
    debug!("évaluation de {expr} en {lu} : {valeur}");

    Ok(Evaluation { valeur, etapes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::parseur::parse;
    use approx::assert_relative_eq;

    fn ok(texte: &str, x0: f64) -> Evaluation {
        let e = parse(texte).unwrap();
        evaluate(&e, x0).unwrap_or_else(|err| panic!("evaluate({texte:?}, {x0}) erreur: {err}"))
    }

    fn err(texte: &str, x0: f64) -> EvaluationError {
        let e = parse(texte).unwrap();
        evaluate(&e, x0).expect_err("erreur attendue")
    }

    fn contient(etapes: &[String], needle: &str) -> bool {
        etapes.iter().any(|l| l.contains(needle))
    }

    #[test]
    fn parabole_en_deux() {
        let ev = ok("x^2 - 4", 2.0);
        assert_eq!(ev.valeur, 0.0);
        assert!(ev.etapes[0].starts_with("f(x) = "));
        assert_eq!(ev.etapes.last().map(String::as_str), Some("valeur finale = 0"));
        assert!(contient(&ev.etapes, "valeur exacte = 0"));
    }

    #[test]
    fn decimal_lu_exactement() {
        let ev = ok("10x", 0.1);
        assert!(contient(&ev.etapes, "x = 0.1"));
        assert!(contient(&ev.etapes, "valeur exacte = 1"));
        assert_eq!(ev.valeur, 1.0);
    }

    #[test]
    fn angle_remarquable() {
        let ev = ok("sin(pi*x)", 1.0 / 6.0);
        assert_relative_eq!(ev.valeur, 0.5, epsilon = 1e-12);

        let ev = ok("2*sin(pi*x)", 0.5);
        assert!(contient(&ev.etapes, "sin"));
        assert_eq!(ev.etapes.last().map(String::as_str), Some("valeur finale = 2"));
    }

    #[test]
    fn erreurs_typees() {
        assert_eq!(err("1/x", 0.0), EvaluationError::DivisionParZero);
        assert!(matches!(err("log(x)", -1.0), EvaluationError::NonReel(_)));
        assert!(matches!(err("sqrt(x)", -4.0), EvaluationError::NonReel(_)));
        assert_eq!(err("tan(pi*x)", 0.5), EvaluationError::Indeterminee);
        assert!(matches!(err("x", f64::INFINITY), EvaluationError::PointNonFini(_)));
        assert!(matches!(err("x", f64::NAN), EvaluationError::PointNonFini(_)));
    }

    #[test]
    fn zero_negatif_normalise() {
        let ev = ok("-x", 0.0);
        assert!(ev.valeur.is_sign_positive());
    }
}
