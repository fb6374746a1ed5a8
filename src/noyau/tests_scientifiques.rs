//! Tests scientifiques (campagne) : propriétés du noyau d’analyse.
//!
//! But : vérifier les invariants de bout en bout sans faire chauffer la machine.
//! - budget temps global par test
//! - expressions de taille bornée
//! - comparaisons flottantes avec tolérance (approx)
//!
//! Notes :
//! - Les images exactes sont comparées par leur affichage (ℝ, ∅, réunions).
//! - Le repli échantillonné n’est jamais déclaré exact : on teste seulement
//!   qu’il recouvre les valeurs attendues.

use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;

use super::domaine::domain;
use super::ensemble::Ensemble;
use super::eval::evaluate;
use super::image::{range, Exactitude};
use super::intersections::intercepts;
use super::maillage::build_mesh;
use super::parseur::parse;
use super::reglages::Reglages;

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/// y ∈ E à `tol` près (les bornes ouvertes atteintes en f64 sont tolérées).
fn proche(e: &Ensemble, y: f64, tol: f64) -> bool {
    e.pieces()
        .iter()
        .any(|i| i.inf - tol <= y && y <= i.sup + tol)
}

const FONCTIONS: [&str; 14] = [
    "x^2 + 1",
    "1/x",
    "sqrt(x^2 - 4)",
    "log(x)",
    "asin(x)",
    "x^(1/3)",
    "(x - 1)^2/x",
    "1/(x^2 - 1)",
    "exp(-x^2)",
    "abs(x) - 2",
    "sin(x)",
    "atan(x) + 1",
    "x*exp(x)",
    "Piecewise((-x, x < 0), (x^2, True))",
];

/* ------------------------ Domaine ------------------------ */

#[test]
fn sci_domaine_reunion_ordonnee_disjointe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);
    let r = Reglages::default();

    for texte in FONCTIONS {
        budget(t0, max);
        let d = domain(&parse(texte).unwrap(), &r).unwrap();
        let p = d.ensemble().pieces();
        assert!(p.iter().all(|i| !i.est_vide()), "pièce vide : {texte}");
        for w in p.windows(2) {
            assert!(
                w[0].sup < w[1].inf || (w[0].sup == w[1].inf && w[0].sup_ouvert && w[1].inf_ouvert),
                "pièces mal ordonnées pour {texte} : {d}"
            );
        }
    }
}

/* ------------------------ Parser ------------------------ */

#[test]
fn sci_parser_une_variable() {
    assert!(parse("x+y").is_err());
    assert_eq!(
        parse("x^2+1").unwrap().arbre(),
        parse("x*x+1").unwrap().arbre()
    );
}

/* ------------------------ Image ------------------------ */

#[test]
fn sci_image_sinus_exacte() {
    let r = Reglages::default();
    let e = parse("sin(x)").unwrap();
    let i = range(&e, &domain(&e, &r).unwrap(), &r);
    assert_eq!(i.exactitude, Exactitude::Exacte);
    assert_eq!(i.ensemble.to_string(), "[-1, 1]");
}

#[test]
fn sci_image_inverse() {
    let r = Reglages::default();
    let e = parse("1/x").unwrap();
    let i = range(&e, &domain(&e, &r).unwrap(), &r);
    if i.est_exacte() {
        assert_eq!(i.ensemble.to_string(), "(-∞, 0) ∪ (0, ∞)");
    } else {
        assert!(i.ensemble.contient(-1.0) && i.ensemble.contient(1.0));
    }
}

#[test]
fn sci_image_exacte_saine() {
    // pour une image exacte : tout x échantillonné dans D donne f(x) ∈ R
    let t0 = Instant::now();
    let max = Duration::from_secs(30);
    let r = Reglages::default();

    for texte in FONCTIONS {
        budget(t0, max);
        let e = parse(texte).unwrap();
        let d = domain(&e, &r).unwrap();
        let i = range(&e, &d, &r);
        if !i.est_exacte() {
            continue;
        }
        for k in -400..=400 {
            let x = k as f64 * 0.025;
            if !d.contient(x) {
                continue;
            }
            if let Some(y) = e.evaluer(x) {
                assert!(
                    proche(&i.ensemble, y, 1e-9 * y.abs().max(1.0)),
                    "{texte} : f({x}) = {y} hors de {}",
                    i.ensemble
                );
            }
        }
    }
}

/* ------------------------ Intersections ------------------------ */

#[test]
fn sci_intersections_parabole() {
    let r = Reglages::default();
    let e = parse("x^2-4").unwrap();
    let i = intercepts(&e, &domain(&e, &r).unwrap(), &r);
    let xs: Vec<f64> = i.axe_x.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![-2.0, 2.0]);
    assert!(i.axe_x.iter().all(|p| p.y == 0.0));
    let y = i.axe_y.expect("intersection avec l’axe des y");
    assert_eq!((y.x, y.y), (0.0, -4.0));
}

#[test]
fn sci_intersections_dans_le_domaine() {
    let t0 = Instant::now();
    let max = Duration::from_secs(30);
    let r = Reglages::default();

    for texte in FONCTIONS {
        budget(t0, max);
        let e = parse(texte).unwrap();
        let d = domain(&e, &r).unwrap();
        let i = intercepts(&e, &d, &r);
        assert!(i.axe_x.windows(2).all(|w| w[0].x < w[1].x), "{texte} : non trié");
        for p in &i.axe_x {
            assert!(d.contient(p.x), "{texte} : zéro {} hors domaine", p.x);
            let y = e.evaluer(p.x).unwrap_or(f64::NAN);
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);
        }
    }
}

/* ------------------------ Évaluation ------------------------ */

#[test]
fn sci_evaluation_parabole() {
    let ev = evaluate(&parse("x^2-4").unwrap(), 2.0).unwrap();
    assert_eq!(ev.valeur, 0.0);
    assert!(!ev.etapes.is_empty());
    assert_eq!(ev.etapes.last().map(String::as_str), Some("valeur finale = 0"));
}

/* ------------------------ Maillage ------------------------ */

#[test]
fn sci_maillage_inverse() {
    let r = Reglages::default();
    let e = parse("1/x").unwrap();
    let d = domain(&e, &r).unwrap();
    let segs = build_mesh(&e, &d, -10.0, 10.0, r.echantillons_maillage, &r).unwrap();
    assert!(segs.len() >= 2);
    for s in &segs {
        assert!(s.points.iter().all(|p| p.0.abs() > 1e-3), "point trop proche de 0");
        let g = s.points.first().map(|p| p.0).unwrap_or(0.0);
        let dr = s.points.last().map(|p| p.0).unwrap_or(0.0);
        assert!(!(g < 0.0 && dr > 0.0), "segment à cheval sur 0");
    }
}

/* ------------------------ Idempotence ------------------------ */

#[test]
fn sci_idempotence() {
    let t0 = Instant::now();
    let max = Duration::from_secs(40);
    let r = Reglages::default();

    for texte in FONCTIONS {
        budget(t0, max);
        let e = parse(texte).unwrap();
        assert_eq!(e, parse(texte).unwrap());

        let d = domain(&e, &r).unwrap();
        assert_eq!(d, domain(&e, &r).unwrap(), "domaine de {texte}");
        assert_eq!(range(&e, &d, &r), range(&e, &d, &r), "image de {texte}");
        assert_eq!(intercepts(&e, &d, &r), intercepts(&e, &d, &r), "intersections de {texte}");
        assert_eq!(
            build_mesh(&e, &d, -3.0, 3.0, 300, &r),
            build_mesh(&e, &d, -3.0, 3.0, 300, &r),
            "maillage de {texte}"
        );
    }
}
