// src/noyau/derivee.rs
//
// Dérivée symbolique (règles usuelles + chaîne), puis simplify().
// Sert uniquement à l’étude de monotonie dans image.rs.

use super::expr::Expr;

fn b(e: Expr) -> Box<Expr> {
    Box::new(e)
}

fn mul(a: Expr, c: Expr) -> Expr {
    Expr::Mul(b(a), b(c))
}

fn div(a: Expr, c: Expr) -> Expr {
    Expr::Div(b(a), b(c))
}

/// d/dx de `e` (la seule variable est celle de l’expression).
pub fn derivee(e: &Expr) -> Expr {
    d(e).simplify()
}

fn d(e: &Expr) -> Expr {
    use Expr::*;

    if !e.contient_var() {
        return match e {
            Indefini => Indefini,
            _ => Expr::zero(),
        };
    }

    match e {
        Var(_) => Expr::entier(1),
        Rat(_) | Pi | E | Indefini => Expr::zero(),

        Add(u, v) => Add(b(d(u)), b(d(v))),
        Sub(u, v) => Sub(b(d(u)), b(d(v))),
        Mul(u, v) => Add(
            b(mul(d(u), (**v).clone())),
            b(mul((**u).clone(), d(v))),
        ),
        Div(u, v) => div(
            Sub(b(mul(d(u), (**v).clone())), b(mul((**u).clone(), d(v)))),
            PowInt(v.clone(), 2),
        ),

        // n·u^(n-1)·u'
        PowInt(u, n) => mul(mul(Expr::entier(*n), PowInt(u.clone(), n - 1)), d(u)),

        Pow(u, v) if !v.contient_var() => mul(
            mul(
                (**v).clone(),
                Pow(u.clone(), b(Sub(v.clone(), b(Expr::entier(1))))),
            ),
            d(u),
        ),
        Pow(u, v) if !u.contient_var() => mul(mul(Ln(u.clone()), e.clone()), d(v)),
        // u^v (v'·ln u + v·u'/u)
        Pow(u, v) => mul(
            e.clone(),
            Add(
                b(mul(d(v), Ln(u.clone()))),
                b(div(mul((**v).clone(), d(u)), (**u).clone())),
            ),
        ),

        Sqrt(u) => div(d(u), mul(Expr::entier(2), e.clone())),
        Sin(u) => mul(Cos(u.clone()), d(u)),
        Cos(u) => Expr::neg(mul(Sin(u.clone()), d(u))),
        Tan(u) => div(d(u), PowInt(b(Cos(u.clone())), 2)),
        Asin(u) => div(
            d(u),
            Sqrt(b(Sub(b(Expr::entier(1)), b(PowInt(u.clone(), 2))))),
        ),
        Acos(u) => Expr::neg(div(
            d(u),
            Sqrt(b(Sub(b(Expr::entier(1)), b(PowInt(u.clone(), 2))))),
        )),
        Atan(u) => div(d(u), Add(b(Expr::entier(1)), b(PowInt(u.clone(), 2)))),
        Ln(u) => div(d(u), (**u).clone()),
        Exp(u) => mul(e.clone(), d(u)),
        // |u|' = u'·u/|u| (hors u = 0)
        Abs(u) => mul(d(u), div((**u).clone(), e.clone())),

        // même gardes : valable à l’intérieur de chaque sélecteur
        Piecewise(branches) => Piecewise(
            branches
                .iter()
                .map(|(x, c)| (d(x), c.clone()))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::parseur::parse;
    use approx::assert_abs_diff_eq;

    fn dv(texte: &str, x: f64) -> f64 {
        let e = parse(texte).unwrap();
        derivee(e.arbre()).evaluer(x).unwrap()
    }

    #[test]
    fn polynome() {
        let e = parse("x^3 - 2x").unwrap();
        assert_eq!(derivee(e.arbre()).evaluer(2.0), Some(10.0));
    }

    #[test]
    fn fonctions_usuelles() {
        assert_abs_diff_eq!(dv("sin(x)", 0.3), 0.3f64.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(dv("log(x)", 4.0), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(dv("sqrt(x)", 4.0), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(dv("atan(x)", 1.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(dv("x^x", 1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dv("2^x", 0.0), 2f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(dv("abs(x)", -3.0), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn constante_nulle() {
        let e = parse("pi^2").unwrap();
        assert_eq!(derivee(e.arbre()), Expr::zero());
    }
}
