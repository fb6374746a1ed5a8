// src/noyau/expr.rs
//
// AST exact (rationnels + π + e) sur UNE variable.
// - Rat      : rationnel exact
// - Pi, E    : constantes symboliques
// - Indefini : résultat exact indéfini (ex: tan(π/2))
// - Var      : la variable désignée (aucune autre n’est construite par le parser)
// - Négation : Sub(0, a)
//
// IMPORTANT (SAFE):
// - simplify() ne doit jamais “inventer” une valeur pour Var.
// - evaluer() ne renvoie jamais NaN/∞ : un échec est typé (Echec).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::collections::BTreeSet;
use std::fmt;

/// Taille maximale (en bits) d’une puissance de rationnel repliée exactement.
const MAX_BITS_EXACT: u64 = 1 << 16;

/// |cos(a)| sous ce seuil : tan(a) est traité comme indéfini.
const COS_NUL: f64 = 1e-15;

/// Marge d’arrondi pour asin/acos aux bornes ±1.
const MARGE_ARC: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Relation {
    pub fn teste(self, a: f64, b: f64) -> bool {
        match self {
            Relation::Lt => a < b,
            Relation::Le => a <= b,
            Relation::Gt => a > b,
            Relation::Ge => a >= b,
            Relation::Eq => a == b,
            Relation::Ne => a != b,
        }
    }

    pub fn teste_rat(self, a: &BigRational, b: &BigRational) -> bool {
        match self {
            Relation::Lt => a < b,
            Relation::Le => a <= b,
            Relation::Gt => a > b,
            Relation::Ge => a >= b,
            Relation::Eq => a == b,
            Relation::Ne => a != b,
        }
    }

    pub fn symbole(self) -> &'static str {
        match self {
            Relation::Lt => "<",
            Relation::Le => "≤",
            Relation::Gt => ">",
            Relation::Ge => "≥",
            Relation::Eq => "=",
            Relation::Ne => "≠",
        }
    }
}

/// Garde d’une branche Piecewise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Vrai,
    Faux,
    Compare(Box<Expr>, Relation, Box<Expr>),
    Et(Box<Condition>, Box<Condition>),
    Ou(Box<Condition>, Box<Condition>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    E,
    Indefini,

    Var(String),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),

    PowInt(Box<Expr>, i64),    // x^n (n entier)
    Pow(Box<Expr>, Box<Expr>), // x^y (y quelconque)

    Sqrt(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
    Asin(Box<Expr>),
    Acos(Box<Expr>),
    Atan(Box<Expr>),
    Ln(Box<Expr>),
    Exp(Box<Expr>),
    Abs(Box<Expr>),

    /// Première branche dont la garde est vraie.
    Piecewise(Vec<(Expr, Condition)>),
}

/// Échec typé d’une évaluation flottante.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Echec {
    DivisionParZero,
    NonReel(&'static str),
    Indetermine,
}

/* ------------------------ Constructeurs / tests simples ------------------------ */

impl Expr {
    pub fn entier(n: i64) -> Expr {
        Expr::Rat(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn rat(n: i64, d: i64) -> Expr {
        Expr::Rat(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    pub fn zero() -> Expr {
        Expr::Rat(BigRational::zero())
    }

    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    /// -a, forme canonique Sub(0, a) (rationnels : signe direct).
    pub fn neg(a: Expr) -> Expr {
        match a {
            Expr::Rat(r) => Expr::Rat(-r),
            other => Expr::Sub(Box::new(Expr::zero()), Box::new(other)),
        }
    }

    pub fn est_zero(&self) -> bool {
        matches!(self, Expr::Rat(r) if r.is_zero())
    }

    pub fn est_un(&self) -> bool {
        matches!(self, Expr::Rat(r) if r.is_one())
    }

    pub fn comme_rat(&self) -> Option<&BigRational> {
        match self {
            Expr::Rat(r) => Some(r),
            _ => None,
        }
    }

    fn est_atome(&self) -> bool {
        match self {
            Expr::Var(_) | Expr::Pi | Expr::E => true,
            Expr::Rat(r) => r.denom().is_one() && !r.is_negative(),
            _ => false,
        }
    }

    /// Enfants directs (y compris les membres des gardes Piecewise).
    pub fn enfants(&self) -> Vec<&Expr> {
        use Expr::*;
        match self {
            Rat(_) | Pi | E | Indefini | Var(_) => Vec::new(),
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Pow(a, b) => vec![a.as_ref(), b.as_ref()],
            PowInt(a, _) | Sqrt(a) | Sin(a) | Cos(a) | Tan(a) | Asin(a) | Acos(a) | Atan(a)
            | Ln(a) | Exp(a) | Abs(a) => vec![a.as_ref()],
            Piecewise(branches) => {
                let mut v = Vec::new();
                for (e, c) in branches {
                    v.push(e);
                    c.membres(&mut v);
                }
                v
            }
        }
    }

    /// Reconstruit le noeud courant en transformant chaque enfant par `f`.
    pub fn reconstruit(&self, f: &mut dyn FnMut(&Expr) -> Expr) -> Expr {
        use Expr::*;
        match self {
            Rat(_) | Pi | E | Indefini | Var(_) => self.clone(),
            Add(a, b) => Add(f(a.as_ref()).boxed(), f(b.as_ref()).boxed()),
            Sub(a, b) => Sub(f(a.as_ref()).boxed(), f(b.as_ref()).boxed()),
            Mul(a, b) => Mul(f(a.as_ref()).boxed(), f(b.as_ref()).boxed()),
            Div(a, b) => Div(f(a.as_ref()).boxed(), f(b.as_ref()).boxed()),
            Pow(a, b) => Pow(f(a.as_ref()).boxed(), f(b.as_ref()).boxed()),
            PowInt(a, n) => PowInt(f(a.as_ref()).boxed(), *n),
            Sqrt(a) => Sqrt(f(a.as_ref()).boxed()),
            Sin(a) => Sin(f(a.as_ref()).boxed()),
            Cos(a) => Cos(f(a.as_ref()).boxed()),
            Tan(a) => Tan(f(a.as_ref()).boxed()),
            Asin(a) => Asin(f(a.as_ref()).boxed()),
            Acos(a) => Acos(f(a.as_ref()).boxed()),
            Atan(a) => Atan(f(a.as_ref()).boxed()),
            Ln(a) => Ln(f(a.as_ref()).boxed()),
            Exp(a) => Exp(f(a.as_ref()).boxed()),
            Abs(a) => Abs(f(a.as_ref()).boxed()),
            Piecewise(branches) => {
                let mut out = Vec::with_capacity(branches.len());
                for (e, c) in branches {
                    let e2 = f(e);
                    out.push((e2, c.reconstruit(&mut *f)));
                }
                Piecewise(out)
            }
        }
    }

    /// Détecte si une expression contient la variable.
    /// Itératif + garde-fous : si l'arbre est trop gros, on retourne true (SAFE).
    pub fn contient_var(&self) -> bool {
        const MAX_NOEUDS: usize = 200_000;

        let mut pile: Vec<&Expr> = Vec::with_capacity(64);
        pile.push(self);
        let mut visites: usize = 0;

        while let Some(e) = pile.pop() {
            visites += 1;
            if visites > MAX_NOEUDS {
                return true;
            }
            if let Expr::Var(_) = e {
                return true;
            }
            pile.extend(e.enfants());
        }
        false
    }

    pub fn nombre_noeuds(&self) -> usize {
        let mut pile: Vec<&Expr> = vec![self];
        let mut n = 0;
        while let Some(e) = pile.pop() {
            n += 1;
            pile.extend(e.enfants());
        }
        n
    }

    /// Noms des variables libres.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let mut pile: Vec<&Expr> = vec![self];
        while let Some(e) = pile.pop() {
            if let Expr::Var(nom) = e {
                out.insert(nom.clone());
            }
            pile.extend(e.enfants());
        }
        out
    }

    pub fn contient_piecewise(&self) -> bool {
        let mut pile: Vec<&Expr> = vec![self];
        while let Some(e) = pile.pop() {
            if let Expr::Piecewise(_) = e {
                return true;
            }
            pile.extend(e.enfants());
        }
        false
    }

    /// Remplace la variable par `valeur` (sans simplifier).
    pub fn substituer(&self, valeur: &Expr) -> Expr {
        match self {
            Expr::Var(_) => valeur.clone(),
            _ => self.reconstruit(&mut |c| c.substituer(valeur)),
        }
    }
}

impl Condition {
    fn membres<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Condition::Vrai | Condition::Faux => {}
            Condition::Compare(a, _, b) => {
                out.push(a);
                out.push(b);
            }
            Condition::Et(a, b) | Condition::Ou(a, b) => {
                a.membres(out);
                b.membres(out);
            }
        }
    }

    pub fn reconstruit(&self, f: &mut dyn FnMut(&Expr) -> Expr) -> Condition {
        match self {
            Condition::Vrai => Condition::Vrai,
            Condition::Faux => Condition::Faux,
            Condition::Compare(a, r, b) => Condition::Compare(f(a.as_ref()).boxed(), *r, f(b.as_ref()).boxed()),
            Condition::Et(a, b) => Condition::Et(Box::new(a.reconstruit(f)), Box::new(b.reconstruit(f))),
            Condition::Ou(a, b) => Condition::Ou(Box::new(a.reconstruit(f)), Box::new(b.reconstruit(f))),
        }
    }

    /// None si un membre n’est pas défini en x.
    pub fn evaluer(&self, x: f64) -> Option<bool> {
        match self {
            Condition::Vrai => Some(true),
            Condition::Faux => Some(false),
            Condition::Compare(a, r, b) => Some(r.teste(a.evaluer(x)?, b.evaluer(x)?)),
            Condition::Et(a, b) => Some(a.evaluer(x)? && b.evaluer(x)?),
            Condition::Ou(a, b) => Some(a.evaluer(x)? || b.evaluer(x)?),
        }
    }

    pub fn simplify(self) -> Condition {
        use Condition::*;
        match self {
            Vrai | Faux => self,
            Compare(a, r, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (Expr::Rat(x), Expr::Rat(y)) => {
                        if r.teste_rat(x, y) {
                            Vrai
                        } else {
                            Faux
                        }
                    }
                    _ => Compare(Box::new(a), r, Box::new(b)),
                }
            }
            Et(a, b) => match (a.simplify(), b.simplify()) {
                (Faux, _) | (_, Faux) => Faux,
                (Vrai, c) | (c, Vrai) => c,
                (a, b) => Et(Box::new(a), Box::new(b)),
            },
            Ou(a, b) => match (a.simplify(), b.simplify()) {
                (Vrai, _) | (_, Vrai) => Vrai,
                (Faux, c) | (c, Faux) => c,
                (a, b) => Ou(Box::new(a), Box::new(b)),
            },
        }
    }
}

/* ------------------------ Simplification exacte (SAFE) ------------------------ */

impl Expr {
    /// Simplification locale (SAFE), sans heuristiques.
    /// Objectif: réduire ce qui est strictement démontrable sans exploser l’arbre.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            Rat(_) | Pi | E | Indefini | Var(_) => self,

            Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (Indefini, _) | (_, Indefini) => Indefini,
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                // x - x => 0
                if a == b && !matches!(a, Indefini) {
                    return Expr::zero();
                }

                match (&a, &b) {
                    (Indefini, _) | (_, Indefini) => Indefini,
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    // -(-u) => u
                    (Rat(x), Sub(z, u)) if x.is_zero() && z.est_zero() => (**u).clone(),
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) if x.is_zero() => Expr::zero(),
                    (_, Rat(y)) if y.is_zero() => Expr::zero(),
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    (Rat(x), _) if *x == -BigRational::one() => Expr::neg(b),
                    _ if a == b => PowInt(Box::new(a), 2).simplify(),
                    (PowInt(u, n), v) if **u == *v => PowInt(u.clone(), n + 1).simplify(),
                    (v, PowInt(u, n)) if **u == *v => PowInt(u.clone(), n + 1).simplify(),
                    (PowInt(u, n), PowInt(v, m)) if u == v => PowInt(u.clone(), n + m).simplify(),
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                match (&a, &b) {
                    // division par zéro : on garde symbolique (l’évaluation typera l’erreur)
                    (_, Rat(y)) if y.is_zero() => Div(Box::new(a), Box::new(b)),
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,
                    (Rat(x), _) if x.is_zero() && !b.contient_var() => Expr::zero(),
                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            PowInt(base, n) => {
                let base = base.simplify();
                if matches!(base, Indefini) {
                    return Indefini;
                }
                if n == 0 {
                    return Rat(BigRational::one());
                }
                if n == 1 {
                    return base;
                }
                match &base {
                    Rat(r) if !(r.is_zero() && n < 0) && puissance_repliable(r, n) => {
                        Rat(rational_pow_int(r.clone(), n))
                    }
                    PowInt(u, m) => match m.checked_mul(n) {
                        Some(k) => PowInt(u.clone(), k).simplify(),
                        None => PowInt(Box::new(base), n),
                    },
                    // (√r)^(2k) => r^k, r rationnel >= 0
                    Sqrt(u) if n % 2 == 0 => match u.comme_rat() {
                        Some(r) if !r.is_negative() && !(r.is_zero() && n < 0) && puissance_repliable(r, n / 2) => {
                            Rat(rational_pow_int(r.clone(), n / 2))
                        }
                        _ => PowInt(Box::new(base), n),
                    },
                    _ => PowInt(Box::new(base), n),
                }
            }

            Pow(base, exp) => {
                let base = base.simplify();
                let exp = exp.simplify();
                if matches!(base, Indefini) || matches!(exp, Indefini) {
                    return Indefini;
                }

                if let Rat(q) = &exp {
                    if q.denom().is_one() {
                        if let Some(n) = q.numer().to_i64() {
                            return PowInt(Box::new(base), n).simplify();
                        }
                    }
                    // x^(1/2) => √x (même domaine)
                    if *q == BigRational::new(BigInt::one(), BigInt::from(2)) {
                        return Sqrt(Box::new(base)).simplify();
                    }
                    // r^(p/2) exact si r carré parfait
                    if q.denom() == &BigInt::from(2) {
                        if let (Rat(r), Some(p)) = (&base, q.numer().to_i64()) {
                            if let Some(s) = rational_sqrt_exact(r) {
                                if !(s.is_zero() && p < 0) && puissance_repliable(&s, p) {
                                    return Rat(rational_pow_int(s, p));
                                }
                            }
                        }
                    }
                }

                if matches!(base, E) {
                    return Exp(Box::new(exp)).simplify();
                }

                Pow(Box::new(base), Box::new(exp))
            }

            Sqrt(x) => {
                let x = x.simplify();
                match &x {
                    Indefini => Indefini,
                    Rat(r) => match rational_sqrt_exact(r) {
                        Some(s) => Rat(s),
                        None => Sqrt(Box::new(x)),
                    },
                    // √(u²) = |u| sur les réels
                    PowInt(u, 2) => Abs(u.clone()),
                    _ => Sqrt(Box::new(x)),
                }
            }

            Sin(x) => unaire(x, Sin),
            Cos(x) => unaire(x, Cos),
            Tan(x) => unaire(x, Tan),

            Asin(x) => {
                let x = x.simplify();
                if x.est_zero() {
                    return x;
                }
                unaire(Box::new(x), Asin)
            }
            Acos(x) => {
                let x = x.simplify();
                if x.est_un() {
                    return Expr::zero();
                }
                unaire(Box::new(x), Acos)
            }
            Atan(x) => {
                let x = x.simplify();
                if x.est_zero() {
                    return x;
                }
                unaire(Box::new(x), Atan)
            }

            Ln(x) => {
                let x = x.simplify();
                match x {
                    Indefini => Indefini,
                    Rat(r) if r.is_one() => Expr::zero(),
                    E => Rat(BigRational::one()),
                    // ln(exp(u)) = u pour tout u réel
                    Exp(u) => *u,
                    other => Ln(Box::new(other)),
                }
            }

            Exp(x) => {
                let x = x.simplify();
                match x {
                    Indefini => Indefini,
                    Rat(r) if r.is_zero() => Rat(BigRational::one()),
                    other => Exp(Box::new(other)),
                }
            }

            Abs(x) => {
                let x = x.simplify();
                match x {
                    Indefini => Indefini,
                    Rat(r) => Rat(r.abs()),
                    Pi | E => x,
                    Abs(_) | Exp(_) => x,
                    other => Abs(Box::new(other)),
                }
            }

            Piecewise(branches) => {
                let mut out: Vec<(Expr, Condition)> = Vec::with_capacity(branches.len());
                for (e, c) in branches {
                    let c = c.simplify();
                    if c == Condition::Faux {
                        continue;
                    }
                    let vrai = c == Condition::Vrai;
                    out.push((e.simplify(), c));
                    if vrai {
                        // les branches suivantes sont inatteignables
                        break;
                    }
                }
                match out.first() {
                    None => Indefini,
                    Some((_, Condition::Vrai)) => out.swap_remove(0).0,
                    Some(_) => Piecewise(out),
                }
            }
        }
    }
}

fn unaire(x: Box<Expr>, ctor: fn(Box<Expr>) -> Expr) -> Expr {
    let x = x.simplify();
    if matches!(x, Expr::Indefini) {
        return Expr::Indefini;
    }
    ctor(Box::new(x))
}

/* ------------------------ Évaluation flottante ------------------------ */

impl Expr {
    pub fn evaluer(&self, x: f64) -> Option<f64> {
        self.evaluer_detail(x).ok()
    }

    /// Évalue en f64 ; tout résultat non fini devient une erreur typée.
    pub fn evaluer_detail(&self, x: f64) -> Result<f64, Echec> {
        let v = self.eval_brut(x)?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(Echec::Indetermine)
        }
    }

    fn eval_brut(&self, x: f64) -> Result<f64, Echec> {
        use Expr::*;

        let v = match self {
            Rat(r) => r.to_f64().ok_or(Echec::Indetermine)?,
            Pi => std::f64::consts::PI,
            E => std::f64::consts::E,
            Indefini => return Err(Echec::Indetermine),
            Var(_) => x,

            Add(a, b) => a.eval_brut(x)? + b.eval_brut(x)?,
            Sub(a, b) => a.eval_brut(x)? - b.eval_brut(x)?,
            Mul(a, b) => a.eval_brut(x)? * b.eval_brut(x)?,
            Div(a, b) => {
                let num = a.eval_brut(x)?;
                let den = b.eval_brut(x)?;
                if den == 0.0 {
                    return Err(Echec::DivisionParZero);
                }
                num / den
            }

            PowInt(a, n) => {
                let base = a.eval_brut(x)?;
                if base == 0.0 && *n < 0 {
                    return Err(Echec::DivisionParZero);
                }
                match i32::try_from(*n) {
                    Ok(k) => base.powi(k),
                    Err(_) => base.powf(*n as f64),
                }
            }

            Pow(a, b) => {
                let base = a.eval_brut(x)?;
                let exp = b.eval_brut(x)?;
                if base == 0.0 && exp < 0.0 {
                    return Err(Echec::DivisionParZero);
                }
                if base < 0.0 {
                    // racine réelle impaire : (-1)^p * |b|^(p/q)
                    match b.comme_rat() {
                        Some(q) if q.denom().is_odd_bigint() => {
                            let m = base.abs().powf(exp);
                            if q.numer().is_odd_bigint() {
                                -m
                            } else {
                                m
                            }
                        }
                        _ => return Err(Echec::NonReel("puissance fractionnaire d’un négatif")),
                    }
                } else {
                    base.powf(exp)
                }
            }

            Sqrt(a) => {
                let v = a.eval_brut(x)?;
                if v < 0.0 {
                    return Err(Echec::NonReel("racine carrée d’un négatif"));
                }
                v.sqrt()
            }
            Sin(a) => a.eval_brut(x)?.sin(),
            Cos(a) => a.eval_brut(x)?.cos(),
            Tan(a) => {
                let v = a.eval_brut(x)?;
                if v.cos().abs() < COS_NUL {
                    return Err(Echec::Indetermine);
                }
                v.tan()
            }
            Asin(a) => borne_arc(a.eval_brut(x)?, "arc sinus hors de [-1, 1]")?.asin(),
            Acos(a) => borne_arc(a.eval_brut(x)?, "arc cosinus hors de [-1, 1]")?.acos(),
            Atan(a) => a.eval_brut(x)?.atan(),
            Ln(a) => {
                let v = a.eval_brut(x)?;
                if v <= 0.0 {
                    return Err(Echec::NonReel("logarithme d’un nombre non positif"));
                }
                v.ln()
            }
            Exp(a) => a.eval_brut(x)?.exp(),
            Abs(a) => a.eval_brut(x)?.abs(),

            Piecewise(branches) => {
                for (e, c) in branches {
                    if c.evaluer(x) == Some(true) {
                        return e.eval_brut(x);
                    }
                }
                return Err(Echec::Indetermine);
            }
        };

        if v.is_nan() {
            return Err(Echec::Indetermine);
        }
        Ok(v)
    }
}

fn borne_arc(v: f64, msg: &'static str) -> Result<f64, Echec> {
    if v.abs() > 1.0 + MARGE_ARC {
        return Err(Echec::NonReel(msg));
    }
    Ok(v.clamp(-1.0, 1.0))
}

trait Parite {
    fn is_odd_bigint(&self) -> bool;
}

impl Parite for BigInt {
    fn is_odd_bigint(&self) -> bool {
        !(self % BigInt::from(2)).is_zero()
    }
}

/* ------------------------ coeff·π (trig spéciale) ------------------------ */

impl Expr {
    /// Si l’expression vaut exactement c·π (c rationnel), renvoie c.
    /// SAFE: Var => None (on ne “devine” rien). 0 compte comme 0·π.
    pub fn as_coeff_pi(&self) -> Option<BigRational> {
        use Expr::*;

        match self {
            Pi => Some(BigRational::one()),
            Rat(r) if r.is_zero() => Some(BigRational::zero()),
            Rat(_) | E | Indefini | Var(_) => None,

            Mul(a, b) => match (a.as_ref(), b.as_ref()) {
                (Rat(r), autre) | (autre, Rat(r)) => autre.as_coeff_pi().map(|c| c * r),
                _ => None,
            },

            Div(a, b) => match b.as_ref() {
                Rat(r) if !r.is_zero() => a.as_coeff_pi().map(|c| c / r),
                _ => None,
            },

            // Sub(0, x) => -coeff(x) ; sinon différence de deux coeff·π
            Sub(a, b) => Some(a.as_coeff_pi()? - b.as_coeff_pi()?),
            Add(a, b) => Some(a.as_coeff_pi()? + b.as_coeff_pi()?),

            // On refuse de “pousser” coeff·π à travers fonctions/puissances
            _ => None,
        }
    }
}

/* ------------------------ Modulo rationnel exact (sans flottants) ------------------------ */

/// Réduction modulo `periode` d’un coefficient rationnel (2 pour sin/cos, 1 pour tan).
/// Retourne un rationnel dans [0, periode).
///
/// Si coeff = n/d, alors coeff mod periode = (n mod (periode*d))/d.
pub(crate) fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if periode <= 0 || coeff.is_zero() {
        return coeff.clone();
    }

    let d = coeff.denom().clone(); // denom > 0 (num_rational)
    let m = BigInt::from(periode) * &d;

    let mut r = coeff.numer() % &m;
    if r.is_negative() {
        r += &m;
    }
    BigRational::new(r, d)
}

/* ------------------------ Affichage (trace / journal) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Pi => write!(f, "π"),
            E => write!(f, "e"),
            Indefini => write!(f, "indéfini"),
            Var(s) => write!(f, "{s}"),
            Add(a, b) => write!(f, "({a} + {b})"),
            Sub(a, b) if a.est_zero() => write!(f, "(-{b})"),
            Sub(a, b) => write!(f, "({a} - {b})"),
            Mul(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
            PowInt(a, n) => match (a.est_atome(), *n < 0) {
                (true, false) => write!(f, "{a}^{n}"),
                (true, true) => write!(f, "{a}^({n})"),
                (false, false) => write!(f, "({a})^{n}"),
                (false, true) => write!(f, "({a})^({n})"),
            },
            Pow(a, b) if a.est_atome() => write!(f, "{a}^({b})"),
            Pow(a, b) => write!(f, "({a})^({b})"),
            Sqrt(x) => write!(f, "√({x})"),
            Sin(x) => write!(f, "sin({x})"),
            Cos(x) => write!(f, "cos({x})"),
            Tan(x) => write!(f, "tan({x})"),
            Asin(x) => write!(f, "asin({x})"),
            Acos(x) => write!(f, "acos({x})"),
            Atan(x) => write!(f, "atan({x})"),
            Ln(x) => write!(f, "log({x})"),
            Exp(x) => write!(f, "exp({x})"),
            Abs(x) => write!(f, "|{x}|"),
            Piecewise(branches) => {
                write!(f, "Piecewise(")?;
                for (i, (e, c)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "({e}, {c})")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Vrai => write!(f, "True"),
            Condition::Faux => write!(f, "False"),
            Condition::Compare(a, r, b) => write!(f, "{a} {} {b}", r.symbole()),
            Condition::Et(a, b) => write!(f, "({a}) & ({b})"),
            Condition::Ou(a, b) => write!(f, "({a}) | ({b})"),
        }
    }
}

/* ------------------------ Expression (arbre + variable désignée) ------------------------ */

/// Expression validée : son unique variable libre (si présente) est `variable`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    arbre: Expr,
    variable: String,
}

impl Expression {
    pub(crate) fn new(arbre: Expr, variable: impl Into<String>) -> Self {
        Self {
            arbre,
            variable: variable.into(),
        }
    }

    pub fn arbre(&self) -> &Expr {
        &self.arbre
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn evaluer(&self, x: f64) -> Option<f64> {
        self.arbre.evaluer(x)
    }

    pub fn evaluer_detail(&self, x: f64) -> Result<f64, Echec> {
        self.arbre.evaluer_detail(x)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f({}) = {}", self.variable, self.arbre)
    }
}

/* ------------------------ Outils rationnels (utilisés par simplify) ------------------------ */

/// r^n reste de taille raisonnable (estimation : bits(r) · |n|).
fn puissance_repliable(r: &BigRational, n: i64) -> bool {
    if r.denom().is_one() && r.numer().bits() <= 1 {
        // 0, 1, -1
        return n != i64::MIN;
    }
    let bits = r.numer().bits().max(r.denom().bits()).max(1);
    n.unsigned_abs()
        .checked_mul(bits)
        .is_some_and(|b| b <= MAX_BITS_EXACT)
}

pub(crate) fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = rational_pow_int(base, -exp);
        return BigRational::one() / pos;
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

pub(crate) fn rational_sqrt_exact(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_sqrt_exact(r.numer())?;
    let sd = int_sqrt_exact(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn int_sqrt_exact(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}
