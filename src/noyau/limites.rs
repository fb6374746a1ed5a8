// src/noyau/limites.rs
//
// Limites unilatérales sur les réels étendus (f64 avec ±∞).
// - fractions rationnelles : exact (polynome.rs)
// - sinon : règles de composition ; toute forme indéterminée (∞ - ∞, 0·∞,
//   0/0, ∞/∞, oscillation) renvoie None, jamais une valeur inventée.
//
// Le signe d’approche d’une quantité qui tend vers 0 est lu en évaluant
// juste à côté du point.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use super::expr::Expr;
use super::polynome::FractionRationnelle;

/// Point “infini” utilisé pour lire un signe d’approche.
const LOIN: f64 = 1e12;

/// Pas relatif pour lire un signe d’approche en un point fini.
const PAS_APPROCHE: f64 = 1e-8;

/// |cos| sous ce seuil : tan a une asymptote.
const COS_NUL: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cote {
    Gauche,
    Droite,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Point {
    Fini(f64),
    PlusInfini,
    MoinsInfini,
}

impl Point {
    /// Point d’évaluation voisin (du bon côté).
    fn voisin(self, cote: Cote) -> f64 {
        match self {
            Point::PlusInfini => LOIN,
            Point::MoinsInfini => -LOIN,
            Point::Fini(a) => {
                let h = PAS_APPROCHE * a.abs().max(1.0);
                match cote {
                    Cote::Gauche => a - h,
                    Cote::Droite => a + h,
                }
            }
        }
    }

    fn valeur(self) -> f64 {
        match self {
            Point::Fini(a) => a,
            Point::PlusInfini => f64::INFINITY,
            Point::MoinsInfini => f64::NEG_INFINITY,
        }
    }
}

/// Limite de `e` en `point` (côté `cote` si le point est fini).
pub fn limite(e: &Expr, point: Point, cote: Cote) -> Option<f64> {
    if let Some(f) = FractionRationnelle::depuis_expr(e) {
        let v = match point {
            Point::Fini(a) => f.limite(a, cote == Cote::Droite)?,
            Point::PlusInfini => f.limite_infini(true),
            Point::MoinsInfini => f.limite_infini(false),
        };
        return nombre(v);
    }
    nombre(lim(e, point, cote)?)
}

fn nombre(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

fn signe_approche(e: &Expr, point: Point, cote: Cote) -> i8 {
    match e.evaluer(point.voisin(cote)) {
        Some(v) if v > 0.0 => 1,
        Some(v) if v < 0.0 => -1,
        _ => 0,
    }
}

fn infini_signe(s: f64) -> Option<f64> {
    if s > 0.0 {
        Some(f64::INFINITY)
    } else if s < 0.0 {
        Some(f64::NEG_INFINITY)
    } else {
        None
    }
}

fn est_impair(n: &BigInt) -> bool {
    !(n % BigInt::from(2)).is_zero()
}

/// base^exp sur les réels étendus ; racine impaire pour une base négative.
fn puissance_reelle(base: f64, q: Option<&BigRational>, exp: f64) -> Option<f64> {
    if base < 0.0 {
        let q = q.filter(|q| est_impair(q.denom()))?;
        let m = (-base).powf(exp);
        return Some(if est_impair(q.numer()) { -m } else { m });
    }
    nombre(base.powf(exp))
}

/// Expression bornée quelle que soit la variable (oscillations comprises).
fn bornee(e: &Expr) -> bool {
    use Expr::*;
    match e {
        _ if !e.contient_var() => e.evaluer(0.0).is_some(),
        Sin(_) | Cos(_) | Atan(_) | Asin(_) | Acos(_) => true,
        Add(a, b) | Sub(a, b) | Mul(a, b) => bornee(a) && bornee(b),
        Div(a, b) => bornee(a) && !b.contient_var() && b.evaluer(0.0).is_some_and(|v| v != 0.0),
        _ => false,
    }
}

/// a ± b ; un terme infini l’emporte sur un terme borné sans limite.
fn somme(la: Option<f64>, a: &Expr, lb: Option<f64>, b: &Expr, s: f64) -> Option<f64> {
    match (la, lb) {
        (Some(la), Some(lb)) => nombre(la + s * lb),
        (Some(la), None) if la.is_infinite() && bornee(b) => Some(la),
        (None, Some(lb)) if lb.is_infinite() && bornee(a) => Some(s * lb),
        _ => None,
    }
}

fn lim(e: &Expr, point: Point, cote: Cote) -> Option<f64> {
    use Expr::*;

    if !e.contient_var() {
        return e.evaluer(0.0);
    }

    let l = |a: &Expr| limite(a, point, cote);

    match e {
        Var(_) => Some(point.valeur()),
        Rat(_) | Pi | E => e.evaluer(0.0),
        Indefini => None,

        Add(a, b) => somme(l(a), a, l(b), b, 1.0),
        Sub(a, b) => somme(l(a), a, l(b), b, -1.0),
        Mul(a, b) => nombre(l(a)? * l(b)?),
        Div(a, b) => {
            let (la, lb) = (l(a)?, l(b)?);
            if lb == 0.0 {
                if la == 0.0 {
                    return None;
                }
                let s = f64::from(signe_approche(b, point, cote));
                return infini_signe(la.signum() * s);
            }
            nombre(la / lb)
        }

        PowInt(a, n) => {
            let la = l(a)?;
            if la == 0.0 && *n < 0 {
                if n % 2 == 0 {
                    return Some(f64::INFINITY);
                }
                return infini_signe(f64::from(signe_approche(a, point, cote)));
            }
            let k = i32::try_from(*n).ok()?;
            nombre(la.powi(k))
        }

        Pow(a, b) if !b.contient_var() => {
            let la = l(a)?;
            let q = b.as_ref().clone().simplify();
            let exp = q.evaluer(0.0)?;
            if la == 0.0 && exp < 0.0 {
                let s = signe_approche(a, point, cote);
                return match q.comme_rat() {
                    Some(r) if s < 0 && est_impair(r.denom()) && est_impair(r.numer()) => {
                        Some(f64::NEG_INFINITY)
                    }
                    _ => Some(f64::INFINITY),
                };
            }
            puissance_reelle(la, q.comme_rat(), exp)
        }
        // u^v = exp(v·ln u)
        Pow(a, b) => {
            let produit = Mul(b.clone(), Ln(a.clone()).boxed());
            Some(lim(&produit, point, cote)?.exp())
        }

        Sqrt(a) => {
            let la = l(a)?;
            (la >= 0.0).then(|| la.sqrt())
        }
        Exp(a) => Some(l(a)?.exp()),
        Ln(a) => {
            let la = l(a)?;
            if la == 0.0 {
                Some(f64::NEG_INFINITY)
            } else if la < 0.0 {
                None
            } else {
                Some(la.ln())
            }
        }
        Sin(a) => l(a).filter(|v| v.is_finite()).map(f64::sin),
        Cos(a) => l(a).filter(|v| v.is_finite()).map(f64::cos),
        Tan(a) => {
            let la = l(a).filter(|v| v.is_finite())?;
            if la.cos().abs() < COS_NUL {
                return infini_signe(f64::from(signe_approche(e, point, cote)));
            }
            Some(la.tan())
        }
        Atan(a) => Some(l(a)?.atan()),
        Asin(a) => l(a).filter(|v| v.abs() <= 1.0).map(f64::asin),
        Acos(a) => l(a).filter(|v| v.abs() <= 1.0).map(f64::acos),
        Abs(a) => Some(l(a)?.abs()),

        // branche active juste à côté du point
        Piecewise(branches) => {
            let t = point.voisin(cote);
            let (x, _) = branches.iter().find(|(_, c)| c.evaluer(t) == Some(true))?;
            l(x)
        }
    }
}
