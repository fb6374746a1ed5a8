// src/noyau/polynome.rs
//
// Polynômes à coefficients rationnels exacts + fractions rationnelles.
// - Racines réelles : partie sans carré, suite de Sturm, bissection rationnelle
// - Multiplicités : décomposition sans carré (Yun)
// - Tableau de signes exact d’une fraction N/D (pôles exclus)
//
// Aucun flottant n’intervient dans la décision du signe ; les positions des
// racines ne sont arrondies en f64 qu’à la toute fin.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::ops::{Add, Mul, Neg, Sub};

use super::expr::Expr;

/// Degré maximal traité exactement (au-delà : repli numérique).
pub const DEGRE_MAX: usize = 64;

/// Garde-fou des bissections d’isolement.
const ITERATIONS_ISOLEMENT: usize = 400;

/// Largeur relative visée d’un intervalle d’isolement (2^-64).
const BITS_PRECISION: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynome {
    coeffs: Vec<BigRational>, // ascendant, sans zéro de tête
}

fn signe(r: &BigRational) -> i8 {
    if r.is_zero() {
        0
    } else if r.is_positive() {
        1
    } else {
        -1
    }
}

impl Polynome {
    pub fn depuis_coeffs(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    pub fn un() -> Self {
        Self::constante(BigRational::one())
    }

    pub fn constante(c: BigRational) -> Self {
        Self::depuis_coeffs(vec![c])
    }

    pub fn variable() -> Self {
        Self::depuis_coeffs(vec![BigRational::zero(), BigRational::one()])
    }

    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    pub fn est_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// None pour le polynôme nul.
    pub fn degre(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    fn degre_ou_zero(&self) -> usize {
        self.degre().unwrap_or(0)
    }

    pub fn dominant(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn evaluer(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    pub fn evaluer_f64(&self, x: f64) -> f64 {
        let mut acc = 0.0;
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c.to_f64().unwrap_or(f64::NAN);
        }
        acc
    }

    pub fn derivee(&self) -> Polynome {
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c * BigRational::from_integer(BigInt::from(k)))
            .collect();
        Polynome::depuis_coeffs(coeffs)
    }

    pub fn mul_scalaire(&self, c: &BigRational) -> Polynome {
        Polynome::depuis_coeffs(self.coeffs.iter().map(|a| a * c).collect())
    }

    pub fn puissance(&self, n: u32) -> Polynome {
        let mut acc = Polynome::un();
        let mut base = self.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                acc = &acc * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        acc
    }

    /// Division euclidienne ; None si le diviseur est nul.
    pub fn div_rem(&self, d: &Polynome) -> Option<(Polynome, Polynome)> {
        let dd = d.degre()?;
        let n = match self.degre() {
            Some(n) if n >= dd => n,
            _ => return Some((Polynome::zero(), self.clone())),
        };

        let lc = d.dominant();
        let mut r = self.coeffs.clone();
        let mut q = vec![BigRational::zero(); n - dd + 1];

        for k in (0..=(n - dd)).rev() {
            let c = &r[k + dd] / &lc;
            if !c.is_zero() {
                for j in 0..=dd {
                    r[k + j] -= &c * &d.coeffs[j];
                }
            }
            q[k] = c;
        }
        r.truncate(dd);
        Some((Polynome::depuis_coeffs(q), Polynome::depuis_coeffs(r)))
    }

    fn quotient(&self, d: &Polynome) -> Polynome {
        self.div_rem(d).map(|(q, _)| q).unwrap_or_else(Polynome::zero)
    }

    /// Version unitaire (coefficient dominant 1).
    pub fn unitaire(&self) -> Polynome {
        if self.est_zero() {
            return self.clone();
        }
        let lc = self.dominant();
        self.mul_scalaire(&(BigRational::one() / lc))
    }

    /// Divise par |coefficient dominant| : mêmes signes, coefficients plus petits.
    fn normalise_positif(&self) -> Polynome {
        if self.est_zero() {
            return self.clone();
        }
        let lc = self.dominant().abs();
        self.mul_scalaire(&(BigRational::one() / lc))
    }

    /// PGCD unitaire (pgcd(0, 0) = 0).
    pub fn pgcd(a: &Polynome, b: &Polynome) -> Polynome {
        let mut a = a.clone();
        let mut b = b.clone();
        while !b.est_zero() {
            let r = match a.div_rem(&b) {
                Some((_, r)) => r,
                None => break,
            };
            a = b;
            b = r.unitaire();
        }
        a.unitaire()
    }

    /// p / pgcd(p, p') : mêmes racines, toutes simples.
    pub fn partie_sans_carre(&self) -> Polynome {
        if self.degre_ou_zero() == 0 {
            return self.unitaire();
        }
        let g = Polynome::pgcd(self, &self.derivee());
        self.quotient(&g).unitaire()
    }

    /// Décomposition de Yun : p = c·∏ qᵢ^i, qᵢ sans carré et premiers entre eux.
    /// Renvoie les (qᵢ, i) de degré ≥ 1.
    pub fn decomposition_sans_carre(&self) -> Vec<(Polynome, usize)> {
        let mut out = Vec::new();
        if self.degre_ou_zero() == 0 {
            return out;
        }

        let p = self.unitaire();
        let dp = p.derivee();
        let a0 = Polynome::pgcd(&p, &dp);
        let mut b = p.quotient(&a0);
        let c = dp.quotient(&a0);
        let mut d = &c - &b.derivee();

        let mut i = 1;
        while b.degre_ou_zero() > 0 && i <= 2 * DEGRE_MAX {
            let a = Polynome::pgcd(&b, &d);
            if a.degre_ou_zero() > 0 {
                out.push((a.clone(), i));
            }
            let suivant = b.quotient(&a);
            let c = d.quotient(&a);
            d = &c - &suivant.derivee();
            b = suivant;
            i += 1;
        }
        out
    }

    /// Σ cₖ·x^k (la variable est fournie par l’appelant).
    pub fn vers_expr(&self, x: &Expr) -> Expr {
        let mut acc = Expr::zero();
        for (k, c) in self.coeffs.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let terme = match k {
                0 => Expr::Rat(c.clone()),
                1 => Expr::Mul(Box::new(Expr::Rat(c.clone())), Box::new(x.clone())),
                _ => Expr::Mul(
                    Box::new(Expr::Rat(c.clone())),
                    Box::new(Expr::PowInt(Box::new(x.clone()), k as i64)),
                ),
            };
            acc = Expr::Add(Box::new(acc), Box::new(terme));
        }
        acc.simplify()
    }

    /// Signe en ±∞ (0 pour le polynôme nul).
    pub fn signe_en_infini(&self, positif: bool) -> i8 {
        let s = signe(&self.dominant());
        if !positif && self.degre_ou_zero() % 2 == 1 {
            -s
        } else {
            s
        }
    }
}

impl Add for &Polynome {
    type Output = Polynome;
    fn add(self, autre: &Polynome) -> Polynome {
        let n = self.coeffs.len().max(autre.coeffs.len());
        let zero = BigRational::zero();
        let coeffs = (0..n)
            .map(|k| self.coeffs.get(k).unwrap_or(&zero) + autre.coeffs.get(k).unwrap_or(&zero))
            .collect();
        Polynome::depuis_coeffs(coeffs)
    }
}

impl Neg for &Polynome {
    type Output = Polynome;
    fn neg(self) -> Polynome {
        Polynome::depuis_coeffs(self.coeffs.iter().map(|c| -c).collect())
    }
}

impl Sub for &Polynome {
    type Output = Polynome;
    fn sub(self, autre: &Polynome) -> Polynome {
        self + &(-autre)
    }
}

impl Mul for &Polynome {
    type Output = Polynome;
    fn mul(self, autre: &Polynome) -> Polynome {
        if self.est_zero() || autre.est_zero() {
            return Polynome::zero();
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + autre.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in autre.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Polynome::depuis_coeffs(coeffs)
    }
}

/* ------------------------ Suite de Sturm ------------------------ */

pub struct Sturm {
    chaine: Vec<Polynome>,
}

impl Sturm {
    /// `p` doit être sans carré pour que `compte` donne le nombre de racines distinctes.
    pub fn new(p: &Polynome) -> Self {
        let mut chaine = vec![p.clone()];
        if p.degre_ou_zero() == 0 {
            return Self { chaine };
        }
        let mut a = p.clone();
        let mut b = p.derivee();
        while !b.est_zero() {
            chaine.push(b.clone());
            let r = match a.div_rem(&b) {
                Some((_, r)) => r,
                None => break,
            };
            a = b;
            b = (-&r).normalise_positif();
        }
        Self { chaine }
    }

    fn variations<I: Iterator<Item = i8>>(signes: I) -> usize {
        let mut prec = 0;
        let mut n = 0;
        for s in signes {
            if s == 0 {
                continue;
            }
            if prec != 0 && s != prec {
                n += 1;
            }
            prec = s;
        }
        n
    }

    pub fn variations_en(&self, x: &BigRational) -> usize {
        Self::variations(self.chaine.iter().map(|p| signe(&p.evaluer(x))))
    }

    /// Nombre de racines distinctes dans (a, b].
    pub fn compte(&self, a: &BigRational, b: &BigRational) -> usize {
        self.variations_en(a).saturating_sub(self.variations_en(b))
    }
}

/* ------------------------ Isolement des racines ------------------------ */

/// Racine réelle isolée : exacte (rationnelle) ou dans (gauche, droite].
#[derive(Clone, Debug)]
pub struct Racine {
    pub gauche: BigRational,
    pub droite: BigRational,
    pub exacte: Option<BigRational>,
    pub approx: f64,
}

impl Racine {
    fn exacte(r: BigRational) -> Self {
        let approx = r.to_f64().unwrap_or(f64::NAN);
        Self {
            gauche: r.clone(),
            droite: r.clone(),
            exacte: Some(r),
            approx,
        }
    }

    /// `q` sans carré, dont les racines sont parmi celles du polynôme isolé.
    pub fn est_racine_de(&self, q: &Polynome, sturm_q: &Sturm) -> bool {
        match &self.exacte {
            Some(r) => q.evaluer(r).is_zero(),
            None => sturm_q.compte(&self.gauche, &self.droite) >= 1,
        }
    }
}

/// Borne de Cauchy : toute racine vérifie |x| < 1 + max |aᵢ/aₙ|.
fn borne_cauchy(p: &Polynome) -> BigRational {
    let lc = p.dominant().abs();
    let mut m = BigRational::zero();
    for c in &p.coeffs[..p.coeffs.len().saturating_sub(1)] {
        let q = c.abs() / &lc;
        if q > m {
            m = q;
        }
    }
    m + BigRational::one()
}

/// Racines réelles distinctes, triées.
pub fn racines_reelles(p: &Polynome) -> Vec<Racine> {
    let s = p.partie_sans_carre();
    if s.degre_ou_zero() == 0 {
        return Vec::new();
    }
    let sturm = Sturm::new(&s);
    let b = borne_cauchy(&s);
    let mut out = Vec::new();
    isole(&s, &sturm, -b.clone(), b, &mut out, 0);
    out
}

fn isole(
    p: &Polynome,
    sturm: &Sturm,
    a: BigRational,
    b: BigRational,
    out: &mut Vec<Racine>,
    profondeur: usize,
) {
    let n = sturm.compte(&a, &b);
    if n == 0 {
        return;
    }
    if n == 1 || profondeur > ITERATIONS_ISOLEMENT {
        out.push(affine(p, sturm, a, b));
        return;
    }
    let m = (&a + &b) / BigRational::from_integer(BigInt::from(2));
    isole(p, sturm, a, m.clone(), out, profondeur + 1);
    isole(p, sturm, m, b, out, profondeur + 1);
}

/// Une seule racine dans (a, b] : bissection rationnelle jusqu’à 2^-64 relatif.
fn affine(p: &Polynome, sturm: &Sturm, mut a: BigRational, mut b: BigRational) -> Racine {
    if p.evaluer(&b).is_zero() {
        return Racine::exacte(b);
    }

    let deux = BigRational::from_integer(BigInt::from(2));
    let echelle = BigRational::new(BigInt::one(), BigInt::one() << BITS_PRECISION);

    for _ in 0..ITERATIONS_ISOLEMENT {
        let ampleur = a.abs().max(b.abs()).max(BigRational::one());
        if &b - &a <= &echelle * ampleur {
            break;
        }
        let m = (&a + &b) / &deux;
        if p.evaluer(&m).is_zero() {
            return Racine::exacte(m);
        }
        if sturm.compte(&a, &m) == 1 {
            b = m;
        } else {
            a = m;
        }
    }

    let milieu = (&a + &b) / &deux;
    let approx = milieu.to_f64().unwrap_or(f64::NAN);

    // racine rationnelle « ronde » : l’arrondi f64 peut être la valeur exacte
    if let Some(r) = BigRational::from_float(approx) {
        if r > a && r <= b && p.evaluer(&r).is_zero() {
            return Racine::exacte(r);
        }
    }

    Racine {
        gauche: a,
        droite: b,
        exacte: None,
        approx,
    }
}

/* ------------------------ Fractions rationnelles ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NaturePoint {
    Zero,
    Pole,
}

/// Signe constant sur chaque écart entre points consécutifs.
/// `signes.len() == points.len() + 1` ; signes[0] sur (-∞, premier point).
#[derive(Clone, Debug)]
pub struct TableauSignes {
    pub points: Vec<(f64, NaturePoint)>,
    pub signes: Vec<i8>,
}

/// N/D non réduite : les racines de D sont exactement les exclusions.
#[derive(Clone, Debug)]
pub struct FractionRationnelle {
    pub num: Polynome,
    pub den: Polynome,
}

impl FractionRationnelle {
    /// Forme N/D d’une expression rationnelle sur ℚ (None sinon, ou degré trop grand).
    pub fn depuis_expr(e: &Expr) -> Option<Self> {
        use Expr::*;

        let f = match e {
            Rat(r) => Self {
                num: Polynome::constante(r.clone()),
                den: Polynome::un(),
            },
            Var(_) => Self {
                num: Polynome::variable(),
                den: Polynome::un(),
            },
            Add(a, b) | Sub(a, b) => {
                let a = Self::depuis_expr(a)?;
                let b = Self::depuis_expr(b)?;
                let signe_b = |p: &Polynome| {
                    if matches!(e, Sub(_, _)) {
                        -p
                    } else {
                        p.clone()
                    }
                };
                if a.den == b.den {
                    Self {
                        num: &a.num + &signe_b(&b.num),
                        den: a.den,
                    }
                } else {
                    Self {
                        num: &(&a.num * &b.den) + &signe_b(&(&b.num * &a.den)),
                        den: &a.den * &b.den,
                    }
                }
            }
            Mul(a, b) => {
                let a = Self::depuis_expr(a)?;
                let b = Self::depuis_expr(b)?;
                Self {
                    num: &a.num * &b.num,
                    den: &a.den * &b.den,
                }
            }
            Div(a, b) => {
                let a = Self::depuis_expr(a)?;
                let b = Self::depuis_expr(b)?;
                if b.num.est_zero() {
                    return None;
                }
                Self {
                    num: &a.num * &b.den,
                    den: &a.den * &b.num,
                }
            }
            PowInt(a, n) => {
                let k = u32::try_from(n.unsigned_abs()).ok()?;
                if k as usize > DEGRE_MAX {
                    return None;
                }
                let a = Self::depuis_expr(a)?;
                if *n >= 0 {
                    Self {
                        num: a.num.puissance(k),
                        den: a.den.puissance(k),
                    }
                } else {
                    if a.num.est_zero() {
                        return None;
                    }
                    Self {
                        num: a.den.puissance(k),
                        den: a.num.puissance(k),
                    }
                }
            }
            _ => return None,
        };

        if f.num.degre_ou_zero() > DEGRE_MAX || f.den.degre_ou_zero() > DEGRE_MAX {
            return None;
        }
        Some(f)
    }

    /// (N₁, D₁) premiers entre eux, D₁ unitaire.
    pub fn reduite(&self) -> (Polynome, Polynome) {
        let g = Polynome::pgcd(&self.num, &self.den);
        let (n1, d1) = if g.est_zero() {
            (self.num.clone(), self.den.clone())
        } else {
            (self.num.quotient(&g), self.den.quotient(&g))
        };
        let c = BigRational::one() / d1.dominant();
        (n1.mul_scalaire(&c), d1.mul_scalaire(&c))
    }

    /// Dérivée de la forme réduite : (N₁'D₁ - N₁D₁') / D₁².
    pub fn derivee(&self) -> FractionRationnelle {
        let (n1, d1) = self.reduite();
        let num = &(&n1.derivee() * &d1) - &(&n1 * &d1.derivee());
        FractionRationnelle {
            num,
            den: &d1 * &d1,
        }
    }

    pub fn vers_expr(&self, x: &Expr) -> Expr {
        Expr::Div(Box::new(self.num.vers_expr(x)), Box::new(self.den.vers_expr(x))).simplify()
    }

    /// Valeur de la forme réduite (les trous amovibles sont comblés).
    pub fn valeur_reduite(&self, x: f64) -> Option<f64> {
        let (n1, d1) = self.reduite();
        let d = d1.evaluer_f64(x);
        if d == 0.0 || !d.is_finite() {
            return None;
        }
        let v = n1.evaluer_f64(x) / d;
        v.is_finite().then_some(v)
    }

    pub fn tableau_signes(&self) -> TableauSignes {
        let (n1, d1) = self.reduite();

        let den_sc = self.den.partie_sans_carre();
        let sturm_den = Sturm::new(&den_sc);

        if n1.est_zero() {
            let points: Vec<(f64, NaturePoint)> = racines_reelles(&self.den)
                .into_iter()
                .map(|r| (r.approx, NaturePoint::Pole))
                .collect();
            let signes = vec![0; points.len() + 1];
            return TableauSignes { points, signes };
        }

        let racines = racines_reelles(&(&n1 * &self.den));
        let facteurs: Vec<(Polynome, Sturm, usize)> = (&n1 * &d1)
            .decomposition_sans_carre()
            .into_iter()
            .map(|(q, m)| {
                let s = Sturm::new(&q);
                (q, s, m)
            })
            .collect();

        let mut points = Vec::with_capacity(racines.len());
        let mut multiplicites = Vec::with_capacity(racines.len());
        for r in &racines {
            let nature = if r.est_racine_de(&den_sc, &sturm_den) {
                NaturePoint::Pole
            } else {
                NaturePoint::Zero
            };
            let m = facteurs
                .iter()
                .find(|(q, s, _)| r.est_racine_de(q, s))
                .map_or(0, |(_, _, m)| *m);
            points.push((r.approx, nature));
            multiplicites.push(m);
        }

        // signe en +∞ puis on remonte : une multiplicité impaire change le signe
        let mut s = signe(&n1.dominant()) * signe(&d1.dominant());
        let mut signes = vec![0; points.len() + 1];
        signes[points.len()] = s;
        for i in (0..points.len()).rev() {
            if multiplicites[i] % 2 == 1 {
                s = -s;
            }
            signes[i] = s;
        }

        TableauSignes { points, signes }
    }

    /// Limite en ±∞ (réels étendus).
    pub fn limite_infini(&self, positif: bool) -> f64 {
        let (n1, d1) = self.reduite();
        let (dn, dd) = match (n1.degre(), d1.degre()) {
            (None, _) => return 0.0,
            (Some(dn), Some(dd)) => (dn, dd),
            (Some(_), None) => return f64::NAN,
        };
        if dn < dd {
            return 0.0;
        }
        let q = (n1.dominant() / d1.dominant()).to_f64().unwrap_or(f64::NAN);
        if dn == dd {
            return q;
        }
        let s = if !positif && (dn - dd) % 2 == 1 { -q.signum() } else { q.signum() };
        s * f64::INFINITY
    }

    /// Limite unilatérale en un point fini ; None si indéterminée.
    pub fn limite(&self, a: f64, droite: bool) -> Option<f64> {
        let (_, d1) = self.reduite();
        let d1_sc = d1.partie_sans_carre();
        let delta = 1e-9 * a.abs().max(1.0);
        let gauche = BigRational::from_float(a - delta)?;
        let droite_r = BigRational::from_float(a + delta)?;

        if Sturm::new(&d1_sc).compte(&gauche, &droite_r) == 0 {
            return self.valeur_reduite(a);
        }

        // pôle : le signe de l’écart adjacent décide de ±∞
        let t = self.tableau_signes();
        let (i, _) = t
            .points
            .iter()
            .enumerate()
            .filter(|(_, (_, n))| *n == NaturePoint::Pole)
            .min_by(|(_, (x, _)), (_, (y, _))| (x - a).abs().total_cmp(&(y - a).abs()))?;
        let s = if droite { t.signes[i + 1] } else { t.signes[i] };
        match s {
            0 => None,
            s => Some(f64::from(s) * f64::INFINITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn poly(c: &[i64]) -> Polynome {
        Polynome::depuis_coeffs(c.iter().map(|&k| ratio(k, 1)).collect())
    }

    fn x() -> Expr {
        Expr::Var("x".into())
    }

    #[test]
    fn division_euclidienne() {
        // (x^2 - 1) = (x - 1)(x + 1)
        let (q, r) = poly(&[-1, 0, 1]).div_rem(&poly(&[-1, 1])).unwrap();
        assert_eq!(q, poly(&[1, 1]));
        assert!(r.est_zero());
    }

    #[test]
    fn racines_rationnelles_exactes() {
        let r = racines_reelles(&poly(&[-4, 0, 1]));
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].approx, -2.0);
        assert_eq!(r[1].approx, 2.0);
        assert!(r.iter().all(|r| r.exacte.is_some()));
    }

    #[test]
    fn racines_irrationnelles_isolees() {
        let r = racines_reelles(&poly(&[-2, 0, 1]));
        assert_eq!(r.len(), 2);
        assert!((r[1].approx - std::f64::consts::SQRT_2).abs() < 1e-15);
        assert!(r[1].exacte.is_none());
        // x^2 + 1 : aucune racine réelle
        assert!(racines_reelles(&poly(&[1, 0, 1])).is_empty());
    }

    #[test]
    fn racines_multiples_comptees_une_fois() {
        // (x - 1)^3
        let p = poly(&[-1, 1]).puissance(3);
        let r = racines_reelles(&p);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].approx, 1.0);
    }

    #[test]
    fn decomposition_de_yun() {
        // (x - 1)^2 (x + 2)
        let p = &poly(&[-1, 1]).puissance(2) * &poly(&[2, 1]);
        let d = p.decomposition_sans_carre();
        assert_eq!(d, vec![(poly(&[2, 1]), 1), (poly(&[-1, 1]), 2)]);
    }

    #[test]
    fn tableau_avec_pole_et_zero_double() {
        // (x - 1)^2 / x
        let e = Expr::Div(
            Expr::PowInt(Expr::Sub(x().boxed(), Expr::entier(1).boxed()).boxed(), 2).boxed(),
            x().boxed(),
        );
        let t = FractionRationnelle::depuis_expr(&e).unwrap().tableau_signes();
        assert_eq!(t.points, vec![(0.0, NaturePoint::Pole), (1.0, NaturePoint::Zero)]);
        assert_eq!(t.signes, vec![-1, 1, 1]);
    }

    #[test]
    fn limites_rationnelles() {
        let inv = FractionRationnelle::depuis_expr(&Expr::Div(Expr::entier(1).boxed(), x().boxed())).unwrap();
        assert_eq!(inv.limite(0.0, true), Some(f64::INFINITY));
        assert_eq!(inv.limite(0.0, false), Some(f64::NEG_INFINITY));
        assert_eq!(inv.limite_infini(true), 0.0);

        // (x^2 - 1)/(x - 1) : trou amovible en 1
        let e = Expr::Div(
            Expr::Sub(Expr::PowInt(x().boxed(), 2).boxed(), Expr::entier(1).boxed()).boxed(),
            Expr::Sub(x().boxed(), Expr::entier(1).boxed()).boxed(),
        );
        let f = FractionRationnelle::depuis_expr(&e).unwrap();
        assert_eq!(f.limite(1.0, true), Some(2.0));
        assert_eq!(f.limite_infini(false), f64::NEG_INFINITY);
        // le trou reste une exclusion
        assert_eq!(f.tableau_signes().points[1], (1.0, NaturePoint::Pole));
    }
}
