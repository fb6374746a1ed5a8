// src/noyau/maillage.rs
//
// Maillage prêt à tracer : échantillons réguliers de [x_min, x_max],
// découpés en segments qui ne franchissent jamais
// - un trou du domaine ou une évaluation impossible,
// - un changement de pièce du domaine,
// - un saut |Δy| démesuré par rapport aux pas voisins (asymptote, marche),
// - un changement de signe où |y| croît des deux côtés vers la coupure (pôle impair).

use log::debug;
use rayon::prelude::*;

use super::domaine::Domaine;
use super::erreurs::RangeWindowError;
use super::expr::Expression;
use super::reglages::{Reglages, ECHANTILLONS_MAX};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Segment {
    /// x strictement croissant.
    pub points: Vec<(f64, f64)>,
}

impl Segment {
    pub fn premier(&self) -> Option<(f64, f64)> {
        self.points.first().copied()
    }

    pub fn dernier(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }
}

/// Candidat classé : (pièce du domaine, y) ; None si non traçable.
type Classe = Option<(usize, f64)>;

pub fn build_mesh(
    expr: &Expression,
    domaine: &Domaine,
    x_min: f64,
    x_max: f64,
    n: usize,
    r: &Reglages,
) -> Result<Vec<Segment>, RangeWindowError> {
    if !x_min.is_finite() || !x_max.is_finite() || x_max <= x_min {
        return Err(RangeWindowError::FenetreInvalide {
            min: x_min,
            max: x_max,
        });
    }
    if n < 2 {
        return Err(RangeWindowError::EchantillonsInsuffisants(n));
    }
    if n > ECHANTILLONS_MAX {
        return Err(RangeWindowError::EchantillonsExcessifs {
            n,
            max: ECHANTILLONS_MAX,
        });
    }

    let h = (x_max - x_min) / (n - 1) as f64;
    let xs: Vec<f64> = (0..n)
        .map(|k| if k == n - 1 { x_max } else { x_min + k as f64 * h })
        .collect();

    let classes: Vec<Classe> = xs
        .par_iter()
        .map(|&x| {
            let piece = domaine.ensemble().indice_piece(x)?;
            let y = expr.evaluer(x)?;
            Some((piece, y))
        })
        .collect();

    let segments = decoupe(&xs, &classes, h, r.seuil_saut);
    debug!(
        "maillage de {expr} sur [{x_min}, {x_max}] : {n} candidats, {} segment(s)",
        segments.len()
    );
    Ok(segments)
}

fn decoupe(xs: &[f64], classes: &[Classe], h: f64, seuil: f64) -> Vec<Segment> {
    // pas |Δy| entre i-1 et i, seulement si les deux sont sur la même pièce
    let pas = |i: usize| -> Option<f64> {
        if i == 0 || i >= classes.len() {
            return None;
        }
        match (classes[i - 1], classes[i]) {
            (Some((p, a)), Some((q, b))) if p == q => Some((b - a).abs()),
            _ => None,
        }
    };
    let y = |i: usize| classes.get(i).copied().flatten().map(|(_, y)| y);

    // pôle entre i-1 et i : signe opposé, |y| croissant vers la coupure de chaque côté
    let pole = |i: usize| -> bool {
        let (Some(a), Some(b)) = (y(i - 1), y(i)) else {
            return false;
        };
        if a * b >= 0.0 {
            return false;
        }
        let monte_g = i.checked_sub(2).and_then(y).map_or(true, |u| a.abs() > u.abs());
        let monte_d = y(i + 1).map_or(true, |w| b.abs() > w.abs());
        monte_g && monte_d
    };

    let mut out = Vec::new();
    let mut courant = Segment::default();

    for (i, c) in classes.iter().enumerate() {
        let Some((_, y)) = *c else {
            fermer(&mut out, &mut courant);
            continue;
        };

        let coupe = match pas(i) {
            // pièce différente ou précédent non traçable
            None => true,
            Some(dy) => {
                let voisin = pas(i - 1).unwrap_or(0.0).max(pas(i + 1).unwrap_or(0.0));
                dy > seuil * voisin.max(h) || pole(i)
            }
        };
        if coupe {
            fermer(&mut out, &mut courant);
        }
        courant.points.push((xs[i], y));
    }
    fermer(&mut out, &mut courant);
    out
}

fn fermer(out: &mut Vec<Segment>, courant: &mut Segment) {
    if !courant.points.is_empty() {
        out.push(std::mem::take(courant));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::domaine::domain;
    use crate::noyau::parseur::parse;

    fn maille(texte: &str, a: f64, b: f64, n: usize) -> Result<Vec<Segment>, RangeWindowError> {
        let r = Reglages::default();
        let e = parse(texte).unwrap();
        let d = domain(&e, &r).unwrap();
        build_mesh(&e, &d, a, b, n, &r)
    }

    #[test]
    fn inverse_deux_branches() {
        let segs = maille("1/x", -10.0, 10.0, 1600).unwrap();
        assert!(segs.len() >= 2);
        for s in &segs {
            let (g, _) = s.premier().unwrap();
            let (d, _) = s.dernier().unwrap();
            assert!(!(g < 0.0 && d > 0.0), "segment à cheval sur 0 : [{g}, {d}]");
            assert!(s.points.iter().all(|p| p.0 != 0.0));
        }
    }

    #[test]
    fn continue_un_seul_segment() {
        let segs = maille("x^2", -3.0, 3.0, 200).unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].points.len(), 200);
        assert!(segs[0].points.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn trous_du_domaine() {
        let segs = maille("sqrt(x^2 - 4)", -5.0, 5.0, 500).unwrap();
        assert_eq!(segs.len(), 2);
        assert!(segs.iter().flat_map(|s| &s.points).all(|p| p.0.abs() >= 2.0));
    }

    #[test]
    fn saut_detecte() {
        let segs = maille("Piecewise((0, x < 0), (1, True))", -1.0, 1.0, 201).unwrap();
        assert_eq!(segs.len(), 2);
    }

    #[test]
    fn asymptotes_de_tan() {
        let segs = maille("tan(x)", -4.0, 4.0, 1000).unwrap();
        // branches autour de -π/2 et π/2
        assert!(segs.len() >= 3);
    }

    #[test]
    fn asymptotes_lointaines_de_tan() {
        let segs = maille("tan(x)", 95.0, 105.0, 1600).unwrap();
        let poles: Vec<f64> = (30..=33)
            .map(|k| (f64::from(k) + 0.5) * std::f64::consts::PI)
            .filter(|p| (95.0..=105.0).contains(p))
            .collect();
        assert_eq!(poles.len(), 3);
        assert!(segs.len() >= 4);
        for s in &segs {
            let (g, _) = s.premier().unwrap();
            let (d, _) = s.dernier().unwrap();
            assert!(
                poles.iter().all(|p| !(g < *p && *p < d)),
                "segment [{g}, {d}] franchit un pôle"
            );
        }
    }

    #[test]
    fn passage_par_zero_non_coupe() {
        let segs = maille("sin(x)", -10.0, 10.0, 400).unwrap();
        assert_eq!(segs.len(), 1);
        let segs = maille("x^3 - x", -2.0, 2.0, 401).unwrap();
        assert_eq!(segs.len(), 1);
    }

    #[test]
    fn fenetre_invalide() {
        assert!(matches!(
            maille("x", 1.0, 1.0, 10),
            Err(RangeWindowError::FenetreInvalide { .. })
        ));
        assert!(matches!(
            maille("x", 0.0, f64::INFINITY, 10),
            Err(RangeWindowError::FenetreInvalide { .. })
        ));
        assert_eq!(
            maille("x", 0.0, 1.0, 1),
            Err(RangeWindowError::EchantillonsInsuffisants(1))
        );
        assert!(matches!(
            maille("x", 0.0, 1.0, usize::MAX),
            Err(RangeWindowError::EchantillonsExcessifs { .. })
        ));
    }
}
