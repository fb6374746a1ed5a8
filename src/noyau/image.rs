// src/noyau/image.rs
//
// Image (ensemble des valeurs) de f sur son domaine.
// 1) domaine vide          -> ∅ exact
// 2) domaine exact         -> chemin exact, pièce par pièce :
//      Piecewise -> constante -> rationnelle -> composée d’une application
//      connue -> dérivée + signe exact (monotonie, valeurs, limites)
// 3) sinon / tout échec    -> échantillonnage parallèle (jamais déclaré exact)

use log::{debug, warn};
use num_bigint::BigInt;
use num_traits::Zero;
use rayon::prelude::*;

use std::f64::consts::{FRAC_PI_2, PI};

use super::derivee::derivee;
use super::domaine::Domaine;
use super::ensemble::{Ensemble, Intervalle};
use super::erreurs::RangeComputationError;
use super::expr::{Expr, Expression};
use super::limites::{limite, Cote, Point};
use super::polynome::FractionRationnelle;
use super::reglages::Reglages;
use super::signes::{grille, selecteurs, signes, Signes};
use super::trig::applique_trig_speciale;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exactitude {
    Exacte,
    Approchee { echantillons: usize },
    Indeterminee { echantillons: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageResult {
    pub ensemble: Ensemble,
    pub exactitude: Exactitude,
}

impl ImageResult {
    pub fn est_exacte(&self) -> bool {
        self.exactitude == Exactitude::Exacte
    }

    /// Méthode de calcul, une ligne par fait.
    pub fn methode(&self) -> Vec<String> {
        match self.exactitude {
            Exactitude::Exacte => vec![
                "calcul symbolique sur chaque pièce du domaine".to_string(),
                "monotonie par le signe exact de la dérivée, valeurs aux bornes et limites".to_string(),
            ],
            Exactitude::Approchee { echantillons } => vec![
                "échantillonnage dense de chaque pièce du domaine (fenêtre + queues géométriques)".to_string(),
                format!("{echantillons} échantillons évalués ; enveloppe min/max par pièce"),
            ],
            Exactitude::Indeterminee { echantillons } => vec![
                format!("échantillonnage : {echantillons} échantillon évaluable"),
                "aucune valeur exploitable".to_string(),
            ],
        }
    }
}

type Res<T> = Result<T, RangeComputationError>;

pub fn range(expr: &Expression, domaine: &Domaine, r: &Reglages) -> ImageResult {
    if domaine.est_vide() {
        return ImageResult {
            ensemble: Ensemble::vide(),
            exactitude: Exactitude::Exacte,
        };
    }

    if domaine.est_exact() {
        match image_exacte(expr.arbre(), domaine.ensemble(), r) {
            Ok(ensemble) => {
                debug!("image exacte de {expr} : {ensemble}");
                return ImageResult {
                    ensemble,
                    exactitude: Exactitude::Exacte,
                };
            }
            Err(e) => debug!("image de {expr} : calcul exact abandonné ({e}), échantillonnage"),
        }
    }

    image_echantillonnee(expr.arbre(), domaine.ensemble(), r)
}

fn image_exacte(e: &Expr, dom: &Ensemble, r: &Reglages) -> Res<Ensemble> {
    let mut out = Ensemble::vide();
    for piece in dom.pieces() {
        out = out.union(&image_sur(e, piece, r)?);
    }
    Ok(out)
}

fn image_sur(e: &Expr, piece: &Intervalle, r: &Reglages) -> Res<Ensemble> {
    if piece.est_vide() {
        return Ok(Ensemble::vide());
    }

    if let Expr::Piecewise(branches) = e {
        let mut out = Ensemble::vide();
        let morceau = Ensemble::intervalle(*piece);
        for ((x, _), (sel, exact)) in branches.iter().zip(selecteurs(branches, r)) {
            if !exact {
                return Err(RangeComputationError::NonTraitable("garde non exacte"));
            }
            for p in sel.intersection(&morceau).pieces() {
                out = out.union(&image_sur(x, p, r)?);
            }
        }
        return Ok(out);
    }

    if !e.contient_var() {
        return valeur_constante(e).map(|v| Ensemble::points(&[v]));
    }

    if piece.est_point() {
        let v = e
            .evaluer(piece.inf)
            .ok_or(RangeComputationError::NonTraitable("valeur non définie"))?;
        return Ok(Ensemble::points(&[v]));
    }

    if let Some(f) = FractionRationnelle::depuis_expr(e) {
        let x = e.variables().into_iter().next().unwrap_or_else(|| "x".to_string());
        let fp = f.derivee().vers_expr(&Expr::Var(x));
        return par_derivee(e, &fp, piece, r);
    }

    if let Some(Ok(im)) = composee(e, piece, r) {
        return Ok(im);
    }

    par_derivee(e, &derivee(e), piece, r)
}

fn valeur_constante(e: &Expr) -> Res<f64> {
    let mut preuve = Vec::new();
    applique_trig_speciale(e, &mut preuve)
        .evaluer(0.0)
        .ok_or(RangeComputationError::NonTraitable("constante non définie"))
}

/* ------------------------ Monotonie par la dérivée ------------------------ */

fn par_derivee(e: &Expr, fp: &Expr, piece: &Intervalle, r: &Reglages) -> Res<Ensemble> {
    let s = signes(fp, r);
    if !s.exact {
        return Err(RangeComputationError::DeriveeNonExacte);
    }
    image_monotone(e, piece, &s)
}

/// Point témoin à l’intérieur de (u, v).
fn temoin(u: f64, v: f64) -> f64 {
    match (u.is_finite(), v.is_finite()) {
        (true, true) => 0.5 * (u + v),
        (false, false) => 0.0,
        (true, false) => u + u.abs().max(1.0),
        (false, true) => v - v.abs().max(1.0),
    }
}

/// f strictement monotone entre deux ruptures consécutives du signe de f'.
pub(crate) fn image_monotone(e: &Expr, piece: &Intervalle, s: &Signes) -> Res<Ensemble> {
    let mut coupures: Vec<f64> = s
        .positif
        .bornes_finies()
        .into_iter()
        .chain(s.negatif.bornes_finies())
        .chain(s.nul.bornes_finies())
        .filter(|&c| piece.interieur(c))
        .collect();
    coupures.sort_by(f64::total_cmp);
    coupures.dedup();

    let mut bornes = Vec::with_capacity(coupures.len() + 2);
    bornes.push((piece.inf, !piece.inf_ouvert && piece.inf.is_finite()));
    bornes.extend(coupures.iter().map(|&c| (c, true)));
    bornes.push((piece.sup, !piece.sup_ouvert && piece.sup.is_finite()));

    let mut out = Vec::with_capacity(bornes.len());
    for w in bornes.windows(2) {
        let ((u, u_atteint), (v, v_atteint)) = (w[0], w[1]);
        let m = temoin(u, v);

        if s.nul.contient(m) {
            let y = e
                .evaluer(m)
                .ok_or(RangeComputationError::NonTraitable("valeur non définie"))?;
            out.push(Intervalle::point(y));
            continue;
        }
        if !s.positif.contient(m) && !s.negatif.contient(m) {
            return Err(RangeComputationError::NonTraitable("dérivée non définie"));
        }

        let yu = valeur_ou_limite(e, u, u_atteint, Cote::Droite)?;
        let yv = valeur_ou_limite(e, v, v_atteint, Cote::Gauche)?;
        out.push(entre(yu, u_atteint, yv, v_atteint));
    }
    Ok(Ensemble::depuis(out))
}

fn valeur_ou_limite(e: &Expr, x: f64, atteint: bool, cote: Cote) -> Res<f64> {
    if atteint {
        return e
            .evaluer(x)
            .ok_or(RangeComputationError::NonTraitable("valeur non définie"));
    }
    let point = if x == f64::INFINITY {
        Point::PlusInfini
    } else if x == f64::NEG_INFINITY {
        Point::MoinsInfini
    } else {
        Point::Fini(x)
    };
    limite(e, point, cote).ok_or(RangeComputationError::LimiteIndeterminee)
}

/// Intervalle entre les images des deux extrémités (une valeur infinie n’est jamais atteinte).
fn entre(a: f64, a_atteint: bool, b: f64, b_atteint: bool) -> Intervalle {
    // -0 ramené à +0
    let (a, b) = (a + 0.0, b + 0.0);
    let (lo, lo_att, hi, hi_att) = if a <= b {
        (a, a_atteint, b, b_atteint)
    } else {
        (b, b_atteint, a, a_atteint)
    };
    // f monotone et mêmes valeurs aux deux bouts : constante sur le segment
    if lo == hi && lo.is_finite() {
        return Intervalle::point(lo);
    }
    Intervalle::new(lo, hi, !lo_att, !hi_att)
}

/* ------------------------ Compositions connues ------------------------ */

#[derive(Clone, Copy, Debug)]
enum Application {
    Translation(f64),
    Echelle(f64),
    /// x ↦ c - x
    Symetrie(f64),
    /// x ↦ c / x
    Reciproque(f64),
    Exp,
    Ln,
    Racine,
    Atan,
    Asin,
    Acos,
    Abs,
    PuissanceEntiere(i64),
    /// x ↦ x^q (q constant ; impair : dénominateur impair, numérateur impair)
    PuissanceReelle { q: f64, racine_impaire: bool, numerateur_impair: bool },
    /// x ↦ c^x, c > 0
    Exponentielle(f64),
    Sin,
    Cos,
    Tan,
}

fn constante(c: &Expr) -> Option<f64> {
    if c.contient_var() {
        return None;
    }
    valeur_constante(c).ok()
}

fn composee(e: &Expr, piece: &Intervalle, r: &Reglages) -> Option<Res<Ensemble>> {
    use Application as A;
    use Expr::*;

    let (a, app): (&Box<Expr>, Application) = match e {
        Add(a, c) if !c.contient_var() => (a, A::Translation(constante(c)?)),
        Add(c, a) if !c.contient_var() => (a, A::Translation(constante(c)?)),
        Sub(a, c) if !c.contient_var() => (a, A::Translation(-constante(c)?)),
        Sub(c, a) if !c.contient_var() => (a, A::Symetrie(constante(c)?)),
        Mul(c, a) | Mul(a, c) if !c.contient_var() => (a, A::Echelle(constante(c)?)),
        Div(a, c) if !c.contient_var() => {
            let c = constante(c)?;
            if c == 0.0 {
                return None;
            }
            (a, A::Echelle(1.0 / c))
        }
        Div(c, a) if !c.contient_var() => (a, A::Reciproque(constante(c)?)),
        Exp(a) => (a, A::Exp),
        Ln(a) => (a, A::Ln),
        Sqrt(a) => (a, A::Racine),
        Atan(a) => (a, A::Atan),
        Asin(a) => (a, A::Asin),
        Acos(a) => (a, A::Acos),
        Abs(a) => (a, A::Abs),
        PowInt(a, n) => (a, A::PuissanceEntiere(*n)),
        Pow(a, c) if !c.contient_var() => {
            let q = c.as_ref().clone().simplify();
            let v = constante(&q)?;
            let (racine_impaire, numerateur_impair) = match q.comme_rat() {
                Some(q) => (impair(q.denom()), impair(q.numer())),
                None => (false, false),
            };
            (
                a,
                A::PuissanceReelle {
                    q: v,
                    racine_impaire,
                    numerateur_impair,
                },
            )
        }
        Pow(c, a) if !c.contient_var() => {
            let c = constante(c)?;
            if c <= 0.0 {
                return None;
            }
            (a, A::Exponentielle(c))
        }
        Sin(a) => (a, A::Sin),
        Cos(a) => (a, A::Cos),
        Tan(a) => (a, A::Tan),
        _ => return None,
    };

    let j = match image_sur(a, piece, r) {
        Ok(j) => j,
        Err(e) => return Some(Err(e)),
    };
    Some(app.appliquer(&j))
}

fn impair(n: &BigInt) -> bool {
    !(n % BigInt::from(2)).is_zero()
}

/// phase + k·periode contenus dans [inf, sup].
fn multiples(i: &Intervalle, phase: f64, periode: f64) -> Vec<f64> {
    let k0 = ((i.inf - phase) / periode).ceil() as i64;
    let k1 = ((i.sup - phase) / periode).floor() as i64;
    (k0..=k1).map(|k| phase + k as f64 * periode).collect()
}

impl Application {
    fn f(self, x: f64) -> f64 {
        use Application as A;
        match self {
            A::Translation(c) => x + c,
            A::Echelle(c) => x * c,
            A::Symetrie(c) => c - x,
            A::Reciproque(c) => c / x,
            A::Exp => x.exp(),
            A::Ln => x.ln(),
            A::Racine => x.sqrt(),
            A::Atan => x.atan(),
            A::Asin => x.clamp(-1.0, 1.0).asin(),
            A::Acos => x.clamp(-1.0, 1.0).acos(),
            A::Abs => x.abs(),
            A::PuissanceEntiere(n) => match i32::try_from(n) {
                Ok(k) => x.powi(k),
                Err(_) => x.powf(n as f64),
            },
            A::PuissanceReelle {
                q,
                racine_impaire,
                numerateur_impair,
            } => {
                if x.is_sign_negative() && racine_impaire {
                    let m = (-x).powf(q);
                    if numerateur_impair {
                        -m
                    } else {
                        m
                    }
                } else {
                    x.powf(q)
                }
            }
            A::Exponentielle(c) => c.powf(x),
            A::Sin => x.sin(),
            A::Cos => x.cos(),
            A::Tan => {
                if x.cos().abs() < 1e-12 {
                    // asymptote : le signe dépend du côté, posé par l’appelant
                    f64::NAN
                } else {
                    x.tan()
                }
            }
        }
    }

    /// Points où la monotonie change (dans l’intervalle).
    fn coupures(self, i: &Intervalle) -> Vec<f64> {
        use Application as A;
        match self {
            A::Abs | A::Reciproque(_) => vec![0.0],
            A::PuissanceEntiere(n) if n % 2 == 0 || n < 0 => vec![0.0],
            A::PuissanceReelle { .. } => vec![0.0],
            A::Sin => multiples(i, FRAC_PI_2, PI),
            A::Cos => multiples(i, 0.0, PI),
            _ => Vec::new(),
        }
    }

    fn appliquer(self, j: &Ensemble) -> Res<Ensemble> {
        let mut out = Vec::new();
        for i in j.pieces() {
            match self {
                Application::Sin | Application::Cos
                    if !i.est_borne() || i.sup - i.inf >= 2.0 * PI =>
                {
                    out.push(Intervalle::ferme(-1.0, 1.0));
                    continue;
                }
                Application::Tan => self.verifie_branche(i)?,
                _ => {}
            }
            out.extend(self.transporte(i)?);
        }
        Ok(Ensemble::depuis(out))
    }

    /// tan : l’intervalle doit tenir dans une seule branche (-π/2 + kπ, π/2 + kπ).
    fn verifie_branche(self, i: &Intervalle) -> Res<()> {
        if !i.est_borne() {
            return Err(RangeComputationError::NonTraitable("tan sur plusieurs branches"));
        }
        let k = ((temoin(i.inf, i.sup) + FRAC_PI_2) / PI).floor();
        let (g, d) = (k * PI - FRAC_PI_2, k * PI + FRAC_PI_2);
        let dans = |x: f64, ouvert: bool| (x > g && x < d) || (ouvert && (x == g || x == d));
        if dans(i.inf, i.inf_ouvert) && dans(i.sup, i.sup_ouvert) {
            Ok(())
        } else {
            Err(RangeComputationError::NonTraitable("tan sur plusieurs branches"))
        }
    }

    /// Image d’un intervalle : monotone entre coupures, bornes atteintes si fermées.
    fn transporte(self, i: &Intervalle) -> Res<Vec<Intervalle>> {
        if i.est_point() {
            let v = self.f(i.inf);
            if v.is_nan() {
                return Err(RangeComputationError::LimiteIndeterminee);
            }
            return Ok(vec![Intervalle::point(v)]);
        }

        let mut pts = vec![(i.inf, !i.inf_ouvert)];
        pts.extend(self.coupures(i).into_iter().filter(|&c| i.interieur(c)).map(|c| (c, true)));
        pts.push((i.sup, !i.sup_ouvert));

        let mut out = Vec::with_capacity(pts.len());
        for w in pts.windows(2) {
            let ((u, au), (v, av)) = (w[0], w[1]);
            // 0 approché par la droite (+0) ou par la gauche (-0)
            let fu = self.extremite(if u == 0.0 { 0.0 } else { u }, 1.0);
            let fv = self.extremite(if v == 0.0 { -0.0 } else { v }, -1.0);
            if fu.is_nan() || fv.is_nan() {
                return Err(RangeComputationError::LimiteIndeterminee);
            }
            out.push(entre(fu, au && fu.is_finite(), fv, av && fv.is_finite()));
        }
        Ok(out)
    }

    /// Valeur en une extrémité ; `vers` = côté d’où l’on vient (+1 : de la droite).
    fn extremite(self, x: f64, vers: f64) -> f64 {
        if let Application::Tan = self {
            if x.is_finite() && x.cos().abs() < 1e-12 {
                // borne gauche d’une branche : -∞ ; borne droite : +∞
                return -vers * f64::INFINITY;
            }
        }
        self.f(x)
    }
}

/* ------------------------ Repli par échantillonnage ------------------------ */

fn image_echantillonnee(e: &Expr, dom: &Ensemble, r: &Reglages) -> ImageResult {
    let pieces = dom.pieces();
    let n = (r.echantillons_image / pieces.len().max(1)).max(64);

    let mut out = Vec::with_capacity(pieces.len());
    let mut total = 0;
    for p in pieces {
        let xs = grille(p, n, r);
        let ys: Vec<f64> = xs
            .par_iter()
            .filter(|&&t| p.contient(t))
            .filter_map(|&t| e.evaluer(t))
            .collect();
        total += ys.len();
        if ys.is_empty() {
            continue;
        }

        let (lo, hi) = ys
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &y| (a.min(y), b.max(y)));
        let lo = if lo < -r.seuil_infini { f64::NEG_INFINITY } else { lo };
        let hi = if hi > r.seuil_infini { f64::INFINITY } else { hi };
        out.push(Intervalle::ferme(lo, hi));
    }

    debug!("image échantillonnée : {total} valeurs");
    if total == 0 {
        warn!("image : aucun échantillon évaluable sur {dom}");
        return ImageResult {
            ensemble: Ensemble::vide(),
            exactitude: Exactitude::Indeterminee { echantillons: 0 },
        };
    }
    ImageResult {
        ensemble: Ensemble::depuis(out),
        exactitude: Exactitude::Approchee { echantillons: total },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::domaine::domain;
    use crate::noyau::parseur::parse;

    fn im(texte: &str) -> ImageResult {
        let r = Reglages::default();
        let e = parse(texte).unwrap();
        let d = domain(&e, &r).unwrap();
        range(&e, &d, &r)
    }

    #[test]
    fn images_exactes() {
        let cas = [
            ("sin(x)", "[-1, 1]"),
            ("x^2", "[0, ∞)"),
            ("1/x", "(-∞, 0) ∪ (0, ∞)"),
            ("x^2 - 4", "[-4, ∞)"),
            ("exp(x)", "(0, ∞)"),
            ("sqrt(x)", "[0, ∞)"),
            ("atan(x)", "(-1.5707963267948966, 1.5707963267948966)"),
            ("3", "{3}"),
            ("abs(x) + 1", "[1, ∞)"),
            ("log(x)", "ℝ"),
            ("1/(x^2 + 1)", "(0, 1]"),
        ];
        for (texte, attendu) in cas {
            let i = im(texte);
            assert!(i.est_exacte(), "{texte} devrait être exact");
            assert_eq!(i.ensemble.to_string(), attendu, "image de {texte}");
        }
    }

    #[test]
    fn piecewise_reunit_les_images() {
        let i = im("Piecewise((-1, x < 0), (x, True))");
        assert!(i.est_exacte());
        assert_eq!(i.ensemble.to_string(), "{-1} ∪ [0, ∞)");
    }

    #[test]
    fn domaine_vide_image_vide_exacte() {
        let i = im("sqrt(-1 - x^2)");
        assert!(i.est_exacte());
        assert!(i.ensemble.est_vide());
    }

    #[test]
    fn repli_echantillonne() {
        let i = im("x + sin(x)");
        assert!(matches!(i.exactitude, Exactitude::Approchee { .. }));
        assert!(i.ensemble.contient(0.0));
        assert_eq!(i.methode().len(), 2);
    }
}
