// src/noyau/domaine.rs
//
// Domaine de définition : on part de ℝ et on intersecte, noeud par noeud,
// les contraintes “g ⋈ 0” résolues par décomposition de signe (signes.rs).
// - dénominateur / puissance entière négative : g ≠ 0
// - racine, exposant à dénominateur pair     : g ≥ 0 (> 0 si exposant négatif)
// - log : g > 0 ; asin/acos : g ∈ [-1, 1] ; tan : cos(g) ≠ 0
// - Piecewise : ⋃ sélecteurᵢ ∩ dom(brancheᵢ)
//
// Hors de la fenêtre du repli numérique, une contrainte “≠ 0” est supposée tenue
// et une inégalité est supposée fausse : le domaine ne contient jamais un
// intervalle où f n’est pas définie, mais peut ignorer des trous isolés lointains.

use log::debug;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use std::fmt;

use super::ensemble::Ensemble;
use super::erreurs::DomainError;
use super::expr::{Expr, Expression};
use super::reglages::Reglages;
use super::signes::{selecteurs, signes, Signes};
use super::trig::applique_trig_speciale;

/// Au-delà, l’analyse est refusée (DomainError).
pub const MAX_NOEUDS_ANALYSE: usize = 20_000;

#[derive(Clone, Debug, PartialEq)]
pub struct Domaine {
    ensemble: Ensemble,
    exact: bool,
}

impl Domaine {
    pub(crate) fn new(ensemble: Ensemble, exact: bool) -> Self {
        Self { ensemble, exact }
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Toutes les contraintes ont été résolues symboliquement.
    pub fn est_exact(&self) -> bool {
        self.exact
    }

    pub fn contient(&self, x: f64) -> bool {
        self.ensemble.contient(x)
    }

    pub fn est_vide(&self) -> bool {
        self.ensemble.est_vide()
    }
}

impl fmt::Display for Domaine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ensemble)
    }
}

pub fn domain(expr: &Expression, r: &Reglages) -> Result<Domaine, DomainError> {
    let noeuds = expr.arbre().nombre_noeuds();
    if noeuds > MAX_NOEUDS_ANALYSE {
        return Err(DomainError::ExpressionTropGrosse {
            noeuds,
            max: MAX_NOEUDS_ANALYSE,
        });
    }

    let (ensemble, exact) = dom(expr.arbre(), r);
    debug!("domaine de {expr} : {ensemble} (exact : {exact})");
    Ok(Domaine::new(ensemble, exact))
}

/// Conjonction (ensemble, exactitude).
fn et(a: (Ensemble, bool), b: (Ensemble, bool)) -> (Ensemble, bool) {
    (a.0.intersection(&b.0), a.1 && b.1)
}

fn contrainte(s: Signes, choix: fn(&Signes) -> Ensemble) -> (Ensemble, bool) {
    (choix(&s), s.exact)
}

fn est_impair(n: &BigInt) -> bool {
    !(n % BigInt::from(2)).is_zero()
}

fn dom(e: &Expr, r: &Reglages) -> (Ensemble, bool) {
    use Expr::*;

    if !e.contient_var() {
        // constante : définie partout ou nulle part
        let mut preuve = Vec::new();
        let c = applique_trig_speciale(e, &mut preuve);
        let defini = !matches!(c, Indefini) && c.evaluer(0.0).is_some();
        return if defini {
            (Ensemble::reels(), true)
        } else {
            (Ensemble::vide(), true)
        };
    }

    let positif = |s: &Signes| s.positif.clone();

    match e {
        Rat(_) | Pi | E | Var(_) => (Ensemble::reels(), true),
        Indefini => (Ensemble::vide(), true),

        Add(a, b) | Sub(a, b) | Mul(a, b) => et(dom(a, r), dom(b, r)),
        Div(a, b) => et(
            et(dom(a, r), dom(b, r)),
            contrainte(signes(b, r), Signes::hors_zeros),
        ),

        PowInt(a, n) if *n < 0 => et(dom(a, r), contrainte(signes(a, r), Signes::hors_zeros)),
        PowInt(a, _) => dom(a, r),

        Pow(a, b) if !b.contient_var() => {
            let q = b.as_ref().clone().simplify();
            let (impair, negatif) = match q.comme_rat() {
                Some(q) => (est_impair(q.denom()), q.is_negative()),
                None => (false, q.evaluer(0.0).map_or(true, |v| v <= 0.0)),
            };
            let base = match (impair, negatif) {
                (true, false) => (Ensemble::reels(), true),
                (true, true) => contrainte(signes(a, r), Signes::hors_zeros),
                (false, false) => contrainte(signes(a, r), Signes::non_negatif),
                (false, true) => contrainte(signes(a, r), positif),
            };
            et(dom(a, r), base)
        }
        Pow(a, b) if !a.contient_var() => {
            let s = signes(a, r);
            if s.positif.est_reels() {
                dom(b, r)
            } else if s.nul.est_reels() {
                // 0^b : b > 0
                et(dom(b, r), contrainte(signes(b, r), positif))
            } else {
                (Ensemble::vide(), s.exact)
            }
        }
        Pow(a, b) => et(
            et(dom(a, r), dom(b, r)),
            contrainte(signes(a, r), positif),
        ),

        Sqrt(a) => et(dom(a, r), contrainte(signes(a, r), Signes::non_negatif)),
        Ln(a) => et(dom(a, r), contrainte(signes(a, r), positif)),
        Asin(a) | Acos(a) => {
            let haut = Sub(Expr::entier(1).boxed(), a.clone()).simplify();
            let bas = Add(a.clone(), Expr::entier(1).boxed()).simplify();
            et(
                dom(a, r),
                et(
                    contrainte(signes(&haut, r), Signes::non_negatif),
                    contrainte(signes(&bas, r), Signes::non_negatif),
                ),
            )
        }
        Tan(a) => et(
            dom(a, r),
            contrainte(signes(&Cos(a.clone()), r), Signes::hors_zeros),
        ),
        Sin(a) | Cos(a) | Atan(a) | Exp(a) | Abs(a) => dom(a, r),

        Piecewise(branches) => {
            let mut ensemble = Ensemble::vide();
            let mut exact = true;
            for ((x, _), (sel, sel_exact)) in branches.iter().zip(selecteurs(branches, r)) {
                let (d, d_exact) = dom(x, r);
                ensemble = ensemble.union(&sel.intersection(&d));
                exact &= sel_exact && d_exact;
            }
            (ensemble, exact)
        }
    }
}

/// Contraintes lisibles, en pré-ordre (seulement celles qui dépendent de la variable).
pub fn restrictions(expr: &Expression) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut pile: Vec<&Expr> = vec![expr.arbre()];
    while let Some(e) = pile.pop() {
        if let Some(t) = restriction(e) {
            if !out.contains(&t) {
                out.push(t);
            }
        }
        // pré-ordre : enfants empilés à l’envers
        let mut enfants = e.enfants();
        enfants.reverse();
        pile.extend(enfants);
    }
    out
}

fn restriction(e: &Expr) -> Option<String> {
    use Expr::*;
    match e {
        Div(_, b) if b.contient_var() => Some(format!("dénominateur : {b} ≠ 0")),
        PowInt(a, n) if *n < 0 && a.contient_var() => Some(format!("puissance négative : {a} ≠ 0")),
        Sqrt(a) if a.contient_var() => Some(format!("racine : {a} ≥ 0")),
        Pow(a, b) if a.contient_var() => {
            let q = if b.contient_var() {
                None
            } else {
                b.as_ref().clone().simplify().comme_rat().cloned()
            };
            match q {
                Some(q) if est_impair(q.denom()) && q.is_negative() => Some(format!("puissance négative : {a} ≠ 0")),
                Some(q) if est_impair(q.denom()) => None,
                Some(q) if q.is_negative() => Some(format!("puissance : {a} > 0")),
                Some(_) => Some(format!("puissance : {a} ≥ 0")),
                None => Some(format!("puissance : {a} > 0")),
            }
        }
        Ln(a) if a.contient_var() => Some(format!("logarithme : {a} > 0")),
        Asin(a) if a.contient_var() => Some(format!("arc sinus : -1 ≤ {a} ≤ 1")),
        Acos(a) if a.contient_var() => Some(format!("arc cosinus : -1 ≤ {a} ≤ 1")),
        Tan(a) if a.contient_var() => Some(format!("tangente : cos({a}) ≠ 0")),
        _ => None,
    }
}
