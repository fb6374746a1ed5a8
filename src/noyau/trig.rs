// src/noyau/trig.rs
//
// Trig spéciale (angles “exactement reconnus”)
// -----------------------------------------------------------
// - Extraction coeff·π via as_coeff_pi()
// - Réduction modulo période via mod_rationnel() (sin/cos: 2 ; tan: 1)
// - Angles multiples de π/12 dont le dénominateur divise 12 : {1,2,3,4,6}
// - Valeurs remarquables inverses : asin/acos/atan de 0, ±1/2, ±1

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::expr::{mod_rationnel, Expr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcFn {
    Asin,
    Acos,
    Atan,
}

#[derive(Clone, Debug)]
pub enum TrigOutcome {
    Valeur(Expr, String),
    Indefini(String),
}

/// |valeur| d’un angle remarquable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Remarquable {
    Zero,
    Un,
    Demi,
    RacineDeuxSurDeux,
    RacineTroisSurDeux,
    RacineTroisSurTrois,
    RacineTrois,
}

impl Remarquable {
    fn expr(self, negatif: bool) -> Expr {
        let racine = |n: i64| Expr::Sqrt(Expr::entier(n).boxed());
        let e = match self {
            Remarquable::Zero => return Expr::zero(),
            Remarquable::Un => Expr::entier(1),
            Remarquable::Demi => Expr::rat(1, 2),
            Remarquable::RacineDeuxSurDeux => Expr::Div(racine(2).boxed(), Expr::entier(2).boxed()),
            Remarquable::RacineTroisSurDeux => Expr::Div(racine(3).boxed(), Expr::entier(2).boxed()),
            Remarquable::RacineTroisSurTrois => Expr::Div(racine(3).boxed(), Expr::entier(3).boxed()),
            Remarquable::RacineTrois => racine(3),
        };
        if negatif {
            Expr::neg(e)
        } else {
            e
        }
    }

    fn texte(self, negatif: bool) -> String {
        let t = match self {
            Remarquable::Zero => return "0".to_string(),
            Remarquable::Un => "1",
            Remarquable::Demi => "1/2",
            Remarquable::RacineDeuxSurDeux => "√2/2",
            Remarquable::RacineTroisSurDeux => "√3/2",
            Remarquable::RacineTroisSurTrois => "√3/3",
            Remarquable::RacineTrois => "√3",
        };
        if negatif {
            format!("-{t}")
        } else {
            t.to_string()
        }
    }
}

/// sin(t·π/12), t réduit dans [0, 24).
fn sin_douziemes(t: i64) -> Option<(bool, Remarquable)> {
    let t = t.rem_euclid(24);
    let (negatif, u) = if t >= 12 { (true, t - 12) } else { (false, t) };
    let r = match u {
        0 => Remarquable::Zero,
        2 | 10 => Remarquable::Demi,
        3 | 9 => Remarquable::RacineDeuxSurDeux,
        4 | 8 => Remarquable::RacineTroisSurDeux,
        6 => Remarquable::Un,
        _ => return None,
    };
    Some((negatif && r != Remarquable::Zero, r))
}

/// tan(t·π/12) ; Err(()) aux pôles (t ≡ 6 mod 12).
fn tan_douziemes(t: i64) -> Option<Result<(bool, Remarquable), ()>> {
    let u = t.rem_euclid(12);
    let v = match u {
        0 => (false, Remarquable::Zero),
        2 => (false, Remarquable::RacineTroisSurTrois),
        3 => (false, Remarquable::Un),
        4 => (false, Remarquable::RacineTrois),
        6 => return Some(Err(())),
        8 => (true, Remarquable::RacineTrois),
        9 => (true, Remarquable::Un),
        10 => (true, Remarquable::RacineTroisSurTrois),
        _ => return None,
    };
    Some(Ok(v))
}

/// Reconnaît les angles spéciaux pour sin/cos/tan lorsque l’entrée est un multiple rationnel de π.
///
/// Retour:
/// - Some(Valeur(expr_exact, preuve)) si reconnu
/// - Some(Indefini(preuve)) si indéfini (tan(π/2), tan(3π/2))
/// - None si non reconnu
pub fn trig_special(x: &Expr, f: TrigFn) -> Option<TrigOutcome> {
    let coeff = x.as_coeff_pi()?;

    let periode = match f {
        TrigFn::Sin | TrigFn::Cos => 2,
        TrigFn::Tan => 1,
    };
    let reduit = mod_rationnel(&coeff, periode);

    // angle = t·π/12
    let t = douziemes(&reduit)?;
    let angle = format_angle_pi(&reduit);

    let out = match f {
        TrigFn::Sin => {
            let (neg, r) = sin_douziemes(t)?;
            TrigOutcome::Valeur(r.expr(neg), format!("sin({angle}) = {}", r.texte(neg)))
        }
        // cos(θ) = sin(θ + π/2)
        TrigFn::Cos => {
            let (neg, r) = sin_douziemes(t + 6)?;
            TrigOutcome::Valeur(r.expr(neg), format!("cos({angle}) = {}", r.texte(neg)))
        }
        TrigFn::Tan => match tan_douziemes(t)? {
            Ok((neg, r)) => {
                TrigOutcome::Valeur(r.expr(neg), format!("tan({angle}) = {}", r.texte(neg)))
            }
            Err(()) => TrigOutcome::Indefini(format!("tan({angle}) = indéfini")),
        },
    };

    Some(out)
}

/// Valeurs remarquables de asin/acos/atan pour un argument rationnel.
pub fn arc_special(x: &Expr, f: ArcFn) -> Option<(Expr, String)> {
    let r = x.comme_rat()?;
    let demi = BigRational::new(BigInt::one(), BigInt::from(2));

    // coefficient de π (numérateur, dénominateur)
    let c: (i64, i64) = match f {
        ArcFn::Asin | ArcFn::Acos => {
            let base = if r.is_zero() {
                (0, 1)
            } else if r.abs() == demi {
                (1, 6)
            } else if r.abs().is_one() {
                (1, 2)
            } else {
                return None;
            };
            let base = if r.is_negative() { (-base.0, base.1) } else { base };
            match f {
                ArcFn::Asin => base,
                // acos(a) = π/2 - asin(a)
                _ => {
                    let q = BigRational::new(BigInt::one(), BigInt::from(2))
                        - BigRational::new(BigInt::from(base.0), BigInt::from(base.1));
                    (q.numer().to_i64()?, q.denom().to_i64()?)
                }
            }
        }
        ArcFn::Atan => {
            if r.is_zero() {
                (0, 1)
            } else if r.abs().is_one() {
                (if r.is_negative() { -1 } else { 1 }, 4)
            } else {
                return None;
            }
        }
    };

    let coeff = BigRational::new(BigInt::from(c.0), BigInt::from(c.1));
    let valeur = if coeff.is_zero() {
        Expr::zero()
    } else {
        Expr::Mul(Expr::Rat(coeff.clone()).boxed(), Expr::Pi.boxed()).simplify()
    };

    let nom = match f {
        ArcFn::Asin => "asin",
        ArcFn::Acos => "acos",
        ArcFn::Atan => "atan",
    };
    Some((valeur, format!("{nom}({x}) = {}", format_angle_pi(&coeff))))
}

/// Applique trig_special / arc_special PARTOUT dans l’arbre (post-ordre).
/// Une ligne de preuve par valeur reconnue.
pub fn applique_trig_speciale(expr: &Expr, preuve: &mut Vec<String>) -> Expr {
    use Expr::*;

    let e = expr
        .reconstruit(&mut |c| applique_trig_speciale(c, preuve))
        .simplify();

    let trig = match &e {
        Sin(x) => trig_special(x, TrigFn::Sin),
        Cos(x) => trig_special(x, TrigFn::Cos),
        Tan(x) => trig_special(x, TrigFn::Tan),
        _ => None,
    };
    match trig {
        Some(TrigOutcome::Valeur(v, p)) => {
            preuve.push(p);
            return v.simplify();
        }
        Some(TrigOutcome::Indefini(p)) => {
            preuve.push(p);
            return Indefini;
        }
        None => {}
    }

    let arc = match &e {
        Asin(x) => arc_special(x, ArcFn::Asin),
        Acos(x) => arc_special(x, ArcFn::Acos),
        Atan(x) => arc_special(x, ArcFn::Atan),
        _ => None,
    };
    match arc {
        Some((v, p)) => {
            preuve.push(p);
            v
        }
        None => e,
    }
}

/* ------------------------ Outils ------------------------ */

/// coeff (dans [0, période)) -> t tel que coeff·π = t·π/12, si le dénominateur divise 12.
fn douziemes(r: &BigRational) -> Option<i64> {
    let n = r.denom().to_i64()?;
    let k = r.numer().to_i64()?;
    if 12 % n != 0 {
        return None;
    }
    k.checked_mul(12 / n)
}

fn format_angle_pi(c: &BigRational) -> String {
    if c.is_zero() {
        return "0".to_string();
    }
    let k = c.numer();
    let n = c.denom();
    let num = if k.is_one() {
        "π".to_string()
    } else if *k == -BigInt::one() {
        "-π".to_string()
    } else {
        format!("{k}π")
    };
    if n.is_one() {
        num
    } else {
        format!("{num}/{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi_sur(k: i64, n: i64) -> Expr {
        Expr::Div(Expr::Mul(Expr::entier(k).boxed(), Expr::Pi.boxed()).boxed(), Expr::entier(n).boxed())
    }

    fn valeur(x: &Expr, f: TrigFn) -> (Expr, String) {
        match trig_special(x, f) {
            Some(TrigOutcome::Valeur(v, p)) => (v, p),
            autre => panic!("valeur spéciale attendue, obtenu {autre:?}"),
        }
    }

    #[test]
    fn sin_pi_6() {
        let (v, p) = valeur(&pi_sur(1, 6), TrigFn::Sin);
        assert_eq!(v, Expr::rat(1, 2));
        assert_eq!(p, "sin(π/6) = 1/2");
    }

    #[test]
    fn cos_pi_et_modulo() {
        let (v, _) = valeur(&Expr::Pi, TrigFn::Cos);
        assert_eq!(v, Expr::entier(-1));
        // sin(3π/2) = -1 ; sin(-π/2) réduit à 3π/2
        let (v, _) = valeur(&pi_sur(-1, 2), TrigFn::Sin);
        assert_eq!(v, Expr::entier(-1));
    }

    #[test]
    fn tan_pi_2_indefini() {
        assert!(matches!(
            trig_special(&pi_sur(1, 2), TrigFn::Tan),
            Some(TrigOutcome::Indefini(_))
        ));
        let (v, _) = valeur(&pi_sur(3, 4), TrigFn::Tan);
        assert_eq!(v, Expr::entier(-1));
    }

    #[test]
    fn angle_non_remarquable() {
        assert!(trig_special(&pi_sur(1, 5), TrigFn::Sin).is_none());
        assert!(trig_special(&pi_sur(1, 12), TrigFn::Sin).is_none());
        assert!(trig_special(&Expr::Var("x".into()), TrigFn::Sin).is_none());
    }

    #[test]
    fn arcs_remarquables() {
        let (v, p) = arc_special(&Expr::rat(1, 2), ArcFn::Asin).unwrap();
        assert!((v.evaluer(0.0).unwrap() - std::f64::consts::PI / 6.0).abs() < 1e-15);
        assert_eq!(p, "asin(1/2) = π/6");
        let (v, _) = arc_special(&Expr::entier(-1), ArcFn::Acos).unwrap();
        assert_eq!(v, Expr::Pi);
        assert!(arc_special(&Expr::rat(1, 3), ArcFn::Atan).is_none());
    }

    #[test]
    fn application_recursive_avec_preuve() {
        // 1/2 + sin(π/6) = 1
        let e = Expr::Add(Expr::rat(1, 2).boxed(), Expr::Sin(pi_sur(1, 6).boxed()).boxed());
        let mut preuve = Vec::new();
        assert_eq!(applique_trig_speciale(&e, &mut preuve), Expr::entier(1));
        assert_eq!(preuve, vec!["sin(π/6) = 1/2".to_string()]);
    }
}
