//! Tests de propriétés (proptest) : solidité et idempotence de l’analyse.

use proptest::prelude::*;

use super::domaine::domain;
use super::ensemble::{Ensemble, Intervalle};
use super::eval::evaluate;
use super::image::range;
use super::intersections::intercepts;
use super::maillage::build_mesh;
use super::parseur::parse;
use super::reglages::Reglages;

// Petits entiers : coefficients et racines
fn petit() -> impl Strategy<Value = i64> {
    -6i64..=6i64
}

fn non_nul() -> impl Strategy<Value = i64> {
    prop_oneof![(-6i64..=-1i64), (1i64..=6i64)]
}

fn intervalle() -> impl Strategy<Value = Intervalle> {
    (-50i32..50, 0i32..20, any::<bool>(), any::<bool>()).prop_map(|(a, l, g, d)| {
        let a = f64::from(a);
        Intervalle::new(a, a + f64::from(l), g, d)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Ensembles

    #[test]
    fn complement_involutif(v in prop::collection::vec(intervalle(), 0..6)) {
        let e = Ensemble::depuis(v);
        prop_assert_eq!(e.complement().complement(), e.clone());
        prop_assert!(e.intersection(&e.complement()).est_vide());
        prop_assert!(e.union(&e.complement()).est_reels());
    }

    // Intersections exactes d’un produit de facteurs linéaires

    #[test]
    fn racines_du_produit(a in petit(), b in petit()) {
        let r = Reglages::default();
        let e = parse(&format!("(x - ({a}))*(x - ({b}))")).unwrap();
        let d = domain(&e, &r).unwrap();
        let i = intercepts(&e, &d, &r);

        let mut attendu = vec![a.min(b) as f64, a.max(b) as f64];
        attendu.dedup();
        let xs: Vec<f64> = i.axe_x.iter().map(|p| p.x).collect();
        prop_assert!(i.axe_x_exact);
        prop_assert_eq!(xs, attendu);
        prop_assert_eq!(i.axe_y.map(|p| p.y), Some((a * b) as f64));
    }

    // Image exacte d’un trinôme : saine, extremum atteint

    #[test]
    fn image_trinome_saine(a in non_nul(), b in petit(), c in petit()) {
        let r = Reglages::default();
        let e = parse(&format!("({a})*x^2 + ({b})*x + ({c})")).unwrap();
        let d = domain(&e, &r).unwrap();
        let im = range(&e, &d, &r);
        prop_assert!(im.est_exacte());

        // extremum atteint : borne finie fermée du bon côté
        let (bas, haut) = im.ensemble.enveloppe().unwrap();
        if a > 0 {
            prop_assert!(bas.is_finite() && im.ensemble.contient(bas) && haut.is_infinite());
        } else {
            prop_assert!(haut.is_finite() && im.ensemble.contient(haut) && bas.is_infinite());
        }
        for k in -40..=40 {
            let x = f64::from(k) * 0.25;
            let y = e.evaluer(x).unwrap();
            prop_assert!(im.ensemble.contient(y), "f({}) = {} hors de {}", x, y, im.ensemble);
        }
    }

    // Domaine d’une fraction à pôle entier

    #[test]
    fn pole_exclu(a in petit()) {
        let r = Reglages::default();
        let e = parse(&format!("1/(x - ({a}))")).unwrap();
        let d = domain(&e, &r).unwrap();
        let a = a as f64;
        prop_assert!(d.est_exact());
        prop_assert!(!d.contient(a));
        prop_assert!(d.contient(a - 0.5) && d.contient(a + 0.5));

        let segs = build_mesh(&e, &d, -10.0, 10.0, 401, &r).unwrap();
        for s in &segs {
            let g = s.points.first().map(|p| p.0).unwrap_or(a);
            let dr = s.points.last().map(|p| p.0).unwrap_or(a);
            prop_assert!(!(g < a && dr > a), "segment à cheval sur le pôle {}", a);
        }
    }

    // Évaluation exacte d’un polynôme en un entier

    #[test]
    fn evaluation_entiere_exacte(b in petit(), c in petit(), k in petit()) {
        let e = parse(&format!("x^3 + ({b})*x + ({c})")).unwrap();
        let ev = evaluate(&e, k as f64).unwrap();
        let attendu = k * k * k + b * k + c;
        prop_assert_eq!(ev.valeur, attendu as f64);
        let derniere = format!("valeur finale = {}", attendu);
        prop_assert_eq!(ev.etapes.last().cloned(), Some(derniere));
    }

    // Domaine trigonométrique : appartenance == évaluation définie, dans [-L, L]

    #[test]
    fn domaine_trigonometrique_ponctuel(
        forme in 0usize..4,
        a in non_nul(),
        c in -3i64..=3i64,
        xs in prop::collection::vec(-1.0f64..1.0, 32),
    ) {
        let r = Reglages::default();
        let texte = match forme {
            0 => format!("sqrt(sin(({a})*x))"),
            1 => format!("tan(({a})*x)"),
            2 => format!("log(cos(x) + ({c})/4)"),
            _ => format!("1/(sin(x) - ({c})/4)"),
        };
        let e = parse(&texte).unwrap();
        let d = domain(&e, &r).unwrap();
        for t in xs {
            let x = t * r.demi_fenetre;
            prop_assert_eq!(
                d.contient(x),
                e.evaluer(x).is_some(),
                "{} en x = {} : domaine {}", texte, x, d
            );
        }
    }

    // Racines à changement de signe : |f| sous la tolérance

    #[test]
    fn racines_trigonometriques_annulent_f(a in non_nul(), c in -3i64..=3i64) {
        let r = Reglages::default();
        for texte in [format!("tan(({a})*x)"), format!("sin(({a})*x) - ({c})/4")] {
            let e = parse(&texte).unwrap();
            let d = domain(&e, &r).unwrap();
            let i = intercepts(&e, &d, &r);
            prop_assert!(!i.axe_x.is_empty(), "{} : aucune racine", texte);
            for p in &i.axe_x {
                let y = e.evaluer(p.x).unwrap_or(f64::NAN);
                prop_assert!(y.abs() <= r.tolerance_zero, "{} : f({}) = {}", texte, p.x, y);
            }
        }
    }

    // Idempotence : deux passes donnent le même résultat

    #[test]
    fn analyse_idempotente(a in non_nul(), b in petit()) {
        let r = Reglages::default();
        let texte = format!("sqrt(({a})*x + ({b}))/(x - ({b}))");
        let e = parse(&texte).unwrap();
        prop_assert_eq!(&e, &parse(&texte).unwrap());
        let d = domain(&e, &r).unwrap();
        prop_assert_eq!(&d, &domain(&e, &r).unwrap());
        prop_assert_eq!(range(&e, &d, &r), range(&e, &d, &r));
        prop_assert_eq!(intercepts(&e, &d, &r), intercepts(&e, &d, &r));
    }
}
