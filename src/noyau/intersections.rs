// src/noyau/intersections.rs
//
// Intersections avec les axes.
// - axe des y : (0, f(0)) si 0 ∈ D et f(0) réel
// - axe des x : ensemble nul de la décomposition de signe, ∩ D
//   (repli numérique borné à l’enveloppe de D, coupée à la fenêtre d’analyse)

use log::debug;

use std::fmt;

use super::domaine::Domaine;
use super::ensemble::{Ensemble, Intervalle};
use super::expr::Expression;
use super::reglages::Reglages;
use super::signes::signes_dans;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intercept {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Intercept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x + 0.0, self.y + 0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Intersections {
    /// Tri croissant en x, sans doublon.
    pub axe_x: Vec<Intercept>,
    pub axe_y: Option<Intercept>,
    pub axe_x_exact: bool,
}

pub fn intercepts(expr: &Expression, domaine: &Domaine, r: &Reglages) -> Intersections {
    let axe_y = if domaine.contient(0.0) {
        expr.evaluer(0.0)
            .filter(|y| y.is_finite())
            .map(|y| Intercept { x: 0.0, y })
    } else {
        None
    };

    let region = region_numerique(domaine.ensemble(), r.demi_fenetre);
    let s = signes_dans(expr.arbre(), &region, r);
    let nul = s.nul.intersection(domaine.ensemble());

    let mut xs: Vec<f64> = Vec::new();
    for p in nul.pieces() {
        if p.est_point() {
            xs.push(p.inf);
        } else {
            // intervalle de zéros : ses extrémités finies
            xs.extend([p.inf, p.sup].into_iter().filter(|b| b.is_finite()));
        }
    }
    xs.retain(|&x| domaine.contient(x));
    xs.sort_by(f64::total_cmp);
    xs.dedup_by(|b, a| (*b - *a).abs() <= r.tolerance_racines);

    let axe_x = xs.into_iter().map(|x| Intercept { x, y: 0.0 }).collect::<Vec<_>>();
    let axe_x_exact = s.exact && domaine.est_exact();
    debug!(
        "intersections de {expr} : {} zéro(s), exact : {axe_x_exact}",
        axe_x.len()
    );

    Intersections {
        axe_x,
        axe_y,
        axe_x_exact,
    }
}

/// D ∩ [enveloppe de D], les côtés non bornés ramenés à ±l.
fn region_numerique(dom: &Ensemble, l: f64) -> Ensemble {
    let Some((g, d)) = dom.enveloppe() else {
        return Ensemble::vide();
    };
    let g = if g.is_finite() { g } else { (-l).min(d - 2.0 * l) };
    let d = if d.is_finite() { d } else { l.max(g + 2.0 * l) };
    dom.intersection(&Ensemble::intervalle(Intervalle::ferme(g, d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::domaine::domain;
    use crate::noyau::parseur::parse;
    use approx::assert_abs_diff_eq;

    fn inter(texte: &str) -> Intersections {
        let r = Reglages::default();
        let e = parse(texte).unwrap();
        let d = domain(&e, &r).unwrap();
        intercepts(&e, &d, &r)
    }

    #[test]
    fn parabole() {
        let i = inter("x^2 - 4");
        assert!(i.axe_x_exact);
        let xs: Vec<f64> = i.axe_x.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-2.0, 2.0]);
        assert_eq!(i.axe_y, Some(Intercept { x: 0.0, y: -4.0 }));
    }

    #[test]
    fn hors_domaine() {
        let i = inter("1/x");
        assert!(i.axe_x.is_empty());
        assert!(i.axe_y.is_none());

        let i = inter("log(x)");
        assert_eq!(i.axe_x.len(), 1);
        assert_abs_diff_eq!(i.axe_x[0].x, 1.0, epsilon = 1e-12);
        assert!(i.axe_y.is_none());
    }

    #[test]
    fn racines_irrationnelles() {
        let i = inter("x^2 - 2");
        assert_eq!(i.axe_x.len(), 2);
        assert_abs_diff_eq!(i.axe_x[1].x, 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn repli_numerique_sinus() {
        let i = inter("sin(x)");
        assert!(!i.axe_x_exact);
        // zéros kπ dans la fenêtre [-10, 10]
        assert_eq!(i.axe_x.len(), 7);
        assert!(i
            .axe_x
            .windows(2)
            .all(|w| w[0].x < w[1].x));
        assert!(i
            .axe_x
            .iter()
            .any(|p| (p.x - std::f64::consts::PI).abs() < 1e-12));
        assert_eq!(i.axe_x[3].x, 0.0);
    }

    #[test]
    fn pas_de_racine_parasite() {
        // 0 est un trou du domaine, pas une racine
        let i = inter("sin(x)/x");
        assert_eq!(i.axe_x.len(), 6);
        assert!(i.axe_x.iter().all(|p| p.x.abs() > 3.0));

        // racine triple : une seule intersection
        let i = inter("x - sin(x)");
        let xs: Vec<f64> = i.axe_x.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0]);
    }

    #[test]
    fn racines_numeriques_annulent_f() {
        let r = Reglages::default();
        for texte in [
            "sin(x)",
            "x - sin(x)",
            "sin(x)/x",
            "cos(x) - x",
            "x*sin(x)",
            "exp(x) - 3",
            "1 - cos(x)",
            "log(sin(x) + 1/2)",
        ] {
            let e = parse(texte).unwrap();
            let d = domain(&e, &r).unwrap();
            let i = intercepts(&e, &d, &r);
            assert!(!i.axe_x.is_empty(), "{texte} : aucune racine");
            for p in &i.axe_x {
                let y = e.evaluer(p.x).unwrap_or(f64::NAN);
                assert!(y.abs() <= r.tolerance_zero, "{texte} : f({}) = {y}", p.x);
            }
        }
    }

    #[test]
    fn poles_ecartes() {
        // changement de signe en 0 (pôle), |1/x| > |sin(x)/100| sur la fenêtre
        let i = inter("1/x + sin(x)/100");
        assert!(i.axe_x.is_empty());
    }
}
