// src/noyau/signes.rs
//
// Décomposition de signe d’une expression : ensembles où elle est > 0, < 0, = 0.
// Les points où elle n’est pas définie ne sont dans aucun des trois.
//
// Ordre des méthodes :
// 1) constante          -> évaluée (trig spéciale + simplify)
// 2) rationnelle sur ℚ  -> tableau exact (polynome.rs)
// 3) règles de signe     -> produit, quotient, puissances, fonctions monotones…
// 4) sinon              -> grille numérique + bissection (exact = false)
//
// Le repli numérique ne conclut que sur sa fenêtre dense. Au-delà, une course
// ne s’étend à l’infini que si la limite y a le même signe et que les queues
// le confirment ; sinon la zone est rangée dans `inconnu`.

use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rayon::prelude::*;

use super::ensemble::{Ensemble, Intervalle};
use super::expr::{Condition, Expr, Relation};
use super::limites::{limite, Cote, Point};
use super::polynome::{FractionRationnelle, NaturePoint, TableauSignes};
use super::reglages::Reglages;
use super::trig::applique_trig_speciale;

/// Bande de zéro pour le signe flottant d’une constante.
const ZERO_CONSTANTE: f64 = 1e-12;

/// Raison géométrique des queues.
const RAISON_QUEUES: f64 = 1.2;

/// Section dorée (recherche d’un zéro sans changement de signe).
const PHI: f64 = 0.618_033_988_749_894_9;

#[derive(Clone, Debug, PartialEq)]
pub struct Signes {
    pub positif: Ensemble,
    pub negatif: Ensemble,
    pub nul: Ensemble,
    /// Hors de portée de l’échantillonnage : ni le signe ni la définition ne sont connus.
    pub inconnu: Ensemble,
    /// false dès qu’un morceau vient de l’échantillonnage.
    pub exact: bool,
}

impl Signes {
    fn new(positif: Ensemble, negatif: Ensemble, nul: Ensemble, exact: bool) -> Self {
        Self {
            positif,
            negatif,
            nul,
            inconnu: Ensemble::vide(),
            exact,
        }
    }

    fn avec_inconnu(mut self, inconnu: Ensemble) -> Self {
        self.inconnu = inconnu;
        self
    }

    /// Défini nulle part.
    pub fn vide(exact: bool) -> Self {
        Self::new(Ensemble::vide(), Ensemble::vide(), Ensemble::vide(), exact)
    }

    /// Signe constant sur ℝ.
    fn constant(signe: i8, exact: bool) -> Self {
        let mut s = Self::vide(exact);
        match signe {
            1 => s.positif = Ensemble::reels(),
            -1 => s.negatif = Ensemble::reels(),
            _ => s.nul = Ensemble::reels(),
        }
        s
    }

    pub fn defini(&self) -> Ensemble {
        self.positif.union(&self.negatif).union(&self.nul)
    }

    pub fn non_nul(&self) -> Ensemble {
        self.positif.union(&self.negatif)
    }

    pub fn non_negatif(&self) -> Ensemble {
        self.positif.union(&self.nul)
    }

    /// Contrainte “g ≠ 0” : les zones inconnues ne retirent que des points isolés, on les garde.
    pub fn hors_zeros(&self) -> Ensemble {
        self.non_nul().union(&self.inconnu)
    }

    /// Là où l’expression peut être définie.
    fn portee(&self) -> Ensemble {
        self.defini().union(&self.inconnu)
    }

    pub fn oppose(self) -> Self {
        let inconnu = self.inconnu;
        Self::new(self.negatif, self.positif, self.nul, self.exact).avec_inconnu(inconnu)
    }

    pub fn restreint(&self, e: &Ensemble) -> Self {
        Self::new(
            self.positif.intersection(e),
            self.negatif.intersection(e),
            self.nul.intersection(e),
            self.exact,
        )
        .avec_inconnu(self.inconnu.intersection(e))
    }

    fn reunion(self, autre: Signes) -> Self {
        Self::new(
            self.positif.union(&autre.positif),
            self.negatif.union(&autre.negatif),
            self.nul.union(&autre.nul),
            self.exact && autre.exact,
        )
        .avec_inconnu(self.inconnu.union(&autre.inconnu))
    }
}

/// Inconnu d’une combinaison binaire : inconnu d’un côté, possiblement défini de l’autre.
fn inconnu_commun(a: &Signes, b: &Signes) -> Ensemble {
    a.inconnu
        .intersection(&b.portee())
        .union(&b.inconnu.intersection(&a.portee()))
}

/// Signes de `e` sur ℝ.
pub fn signes(e: &Expr, r: &Reglages) -> Signes {
    signes_dans(e, &Ensemble::reels(), r)
}

/// Signes de `e` ; `region` borne uniquement le repli numérique.
pub fn signes_dans(e: &Expr, region: &Ensemble, r: &Reglages) -> Signes {
    use Expr::*;

    if !e.contient_var() {
        return signe_constant(e);
    }
    if let Some(f) = FractionRationnelle::depuis_expr(e) {
        return depuis_tableau(&f.tableau_signes());
    }

    let rec = |a: &Expr| signes_dans(a, region, r);

    match e {
        Mul(a, b) => produit(&rec(a), &rec(b)),
        Div(a, b) => quotient(&rec(a), &rec(b)),
        Sub(z, b) if z.est_zero() => rec(b).oppose(),
        Add(a, b) => somme(e, rec(a), rec(b), region, r),
        Sub(a, b) => somme(e, rec(a), rec(b).oppose(), region, r),

        PowInt(a, n) => puissance_entiere(&rec(a), *n),
        Pow(a, b) => puissance(a, b, region, r),

        Sqrt(a) => {
            let s = rec(a);
            Signes::new(s.positif, Ensemble::vide(), s.nul, s.exact).avec_inconnu(s.inconnu)
        }
        Exp(a) => {
            let s = rec(a);
            Signes::new(s.defini(), Ensemble::vide(), Ensemble::vide(), s.exact).avec_inconnu(s.inconnu)
        }
        Abs(a) => {
            let s = rec(a);
            Signes::new(s.non_nul(), Ensemble::vide(), s.nul, s.exact).avec_inconnu(s.inconnu)
        }
        // log(a) a le signe de a - 1, là où a > 0
        Ln(a) => {
            let s = rec(a);
            let t = rec(&Sub(a.clone(), Expr::entier(1).boxed()).simplify());
            let inconnu = s.inconnu.union(&t.inconnu.intersection(&s.positif));
            let exact = s.exact && t.exact;
            t.restreint(&s.positif).avec_exact(exact).avec_inconnu(inconnu)
        }
        Atan(a) => rec(a),
        Asin(a) => {
            let (borne, exact, inconnu) = borne_arc(a, region, r);
            let s = rec(a);
            let inconnu = inconnu.union(&s.inconnu);
            let ex = s.exact && exact;
            s.restreint(&borne).avec_exact(ex).avec_inconnu(inconnu)
        }
        // acos(a) ≥ 0, nul seulement en a = 1
        Acos(a) => {
            let (borne, exact, inconnu) = borne_arc(a, region, r);
            let t = rec(&Sub(Expr::entier(1).boxed(), a.clone()).simplify());
            let inconnu = inconnu.union(&t.inconnu);
            let t = t.restreint(&borne);
            Signes::new(t.positif, Ensemble::vide(), t.nul, t.exact && exact).avec_inconnu(inconnu)
        }

        Piecewise(branches) => par_morceaux(branches, region, r),

        Indefini => Signes::vide(true),

        // sin, cos, tan d’un argument variable, sommes transcendantes…
        _ => numerique(e, region, r),
    }
}

impl Signes {
    fn avec_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }
}

/// {a ∈ [-1, 1]} pour asin/acos (+ exactitude, + zone inconnue).
fn borne_arc(a: &Expr, region: &Ensemble, r: &Reglages) -> (Ensemble, bool, Ensemble) {
    let haut = signes_dans(&Expr::Sub(Expr::entier(1).boxed(), Box::new(a.clone())).simplify(), region, r);
    let bas = signes_dans(&Expr::Add(Box::new(a.clone()), Expr::entier(1).boxed()).simplify(), region, r);
    (
        haut.non_negatif().intersection(&bas.non_negatif()),
        haut.exact && bas.exact,
        inconnu_commun(&haut, &bas),
    )
}

fn signe_constant(e: &Expr) -> Signes {
    let mut preuve = Vec::new();
    let c = applique_trig_speciale(e, &mut preuve);
    match &c {
        Expr::Rat(q) => Signes::constant(signe_rat(q), true),
        Expr::Indefini => Signes::vide(true),
        _ => match c.evaluer(0.0) {
            Some(v) if v.abs() <= ZERO_CONSTANTE => Signes::constant(0, false),
            Some(v) if v > 0.0 => Signes::constant(1, true),
            Some(_) => Signes::constant(-1, true),
            None => Signes::vide(true),
        },
    }
}

fn signe_rat(q: &BigRational) -> i8 {
    if q.is_zero() {
        0
    } else if q.is_positive() {
        1
    } else {
        -1
    }
}

fn depuis_tableau(t: &TableauSignes) -> Signes {
    let mut pos = Vec::new();
    let mut neg = Vec::new();
    let mut nul = Vec::new();

    let n = t.points.len();
    for k in 0..=n {
        let g = if k == 0 { f64::NEG_INFINITY } else { t.points[k - 1].0 };
        let d = if k == n { f64::INFINITY } else { t.points[k].0 };
        let i = Intervalle::ouvert(g, d);
        match t.signes[k] {
            1 => pos.push(i),
            -1 => neg.push(i),
            _ => nul.push(i),
        }
    }
    for &(x, nature) in &t.points {
        if nature == NaturePoint::Zero {
            nul.push(Intervalle::point(x));
        }
    }

    Signes::new(Ensemble::depuis(pos), Ensemble::depuis(neg), Ensemble::depuis(nul), true)
}

/* ------------------------ Règles de combinaison ------------------------ */

fn produit(a: &Signes, b: &Signes) -> Signes {
    let positif = a
        .positif
        .intersection(&b.positif)
        .union(&a.negatif.intersection(&b.negatif));
    let negatif = a
        .positif
        .intersection(&b.negatif)
        .union(&a.negatif.intersection(&b.positif));
    let nul = a
        .nul
        .intersection(&b.defini())
        .union(&b.nul.intersection(&a.defini()));
    Signes::new(positif, negatif, nul, a.exact && b.exact).avec_inconnu(inconnu_commun(a, b))
}

fn quotient(a: &Signes, b: &Signes) -> Signes {
    let mut s = produit(a, b);
    s.nul = a.nul.intersection(&b.non_nul());
    s
}

fn somme(e: &Expr, a: Signes, b: Signes, region: &Ensemble, r: &Reglages) -> Signes {
    let exact = a.exact && b.exact;

    let positif = a
        .positif
        .intersection(&b.non_negatif())
        .union(&a.nul.intersection(&b.positif));
    let negatif = a
        .negatif
        .intersection(&b.negatif.union(&b.nul))
        .union(&a.nul.intersection(&b.negatif));
    let nul = a.nul.intersection(&b.nul);

    // signes opposés, ou un terme hors de portée : seul l’échantillonnage tranche
    let mixte = a
        .positif
        .intersection(&b.negatif)
        .union(&a.negatif.intersection(&b.positif))
        .union(&inconnu_commun(&a, &b));
    if mixte.est_vide() {
        return Signes::new(positif, negatif, nul, exact);
    }

    let zone = mixte.intersection(region);
    debug!("signe de {e} : repli numérique sur {zone}");
    let n = numerique(e, &zone, r).restreint(&mixte);
    Signes::new(positif, negatif, nul, false).reunion(n)
}

fn puissance_entiere(a: &Signes, n: i64) -> Signes {
    let vide = Ensemble::vide;
    let s = match (n.signum(), n % 2 == 0) {
        (0, _) => Signes::new(a.defini(), vide(), vide(), a.exact),
        (1, true) => Signes::new(a.non_nul(), vide(), a.nul.clone(), a.exact),
        (1, false) => return a.clone(),
        (_, true) => Signes::new(a.non_nul(), vide(), vide(), a.exact),
        (_, false) => Signes::new(a.positif.clone(), a.negatif.clone(), vide(), a.exact),
    };
    s.avec_inconnu(a.inconnu.clone())
}

fn est_impair(n: &BigInt) -> bool {
    !(n % BigInt::from(2)).is_zero()
}

fn puissance(a: &Expr, b: &Expr, region: &Ensemble, r: &Reglages) -> Signes {
    let vide = Ensemble::vide;

    if !b.contient_var() {
        let sa = signes_dans(a, region, r);
        let b = b.clone().simplify();
        if let Some(q) = b.comme_rat() {
            let nul = if q.is_positive() { sa.nul.clone() } else { vide() };
            // dénominateur impair : racine réelle des négatifs
            let s = match (est_impair(q.denom()), est_impair(q.numer())) {
                (true, false) => Signes::new(sa.non_nul(), vide(), nul, sa.exact),
                (true, true) => Signes::new(sa.positif.clone(), sa.negatif.clone(), nul, sa.exact),
                (false, _) => Signes::new(sa.positif.clone(), vide(), nul, sa.exact),
            };
            return s.avec_inconnu(sa.inconnu);
        }
        // exposant constant irrationnel : base ≥ 0
        return match b.evaluer(0.0) {
            Some(v) => {
                let nul = if v > 0.0 { sa.nul.clone() } else { vide() };
                Signes::new(sa.positif, vide(), nul, sa.exact).avec_inconnu(sa.inconnu)
            }
            None => Signes::vide(sa.exact),
        };
    }

    let sb = signes_dans(b, region, r);

    if !a.contient_var() {
        let sc = signe_constant(a);
        let exact = sc.exact && sb.exact;
        if sc.positif.est_reels() {
            return Signes::new(sb.defini(), vide(), vide(), exact).avec_inconnu(sb.inconnu);
        }
        if sc.nul.est_reels() {
            // 0^b : défini (et nul) là où b > 0
            return Signes::new(vide(), vide(), sb.positif, exact).avec_inconnu(sb.inconnu);
        }
        return Signes::vide(exact);
    }

    let sa = signes_dans(a, region, r);
    let inconnu = inconnu_commun(&sa, &sb);
    Signes::new(sa.positif.intersection(&sb.defini()), vide(), vide(), sa.exact && sb.exact)
        .avec_inconnu(inconnu)
}

/* ------------------------ Piecewise ------------------------ */

/// Ensemble où la garde est vraie (+ exactitude).
pub fn ensemble_condition(c: &Condition, r: &Reglages) -> (Ensemble, bool) {
    match c {
        Condition::Vrai => (Ensemble::reels(), true),
        Condition::Faux => (Ensemble::vide(), true),
        Condition::Compare(a, rel, b) => {
            let d = Expr::Sub(a.clone(), b.clone()).simplify();
            let s = signes(&d, r);
            let e = match rel {
                Relation::Lt => s.negatif.clone(),
                Relation::Le => s.negatif.union(&s.nul),
                Relation::Gt => s.positif.clone(),
                Relation::Ge => s.non_negatif(),
                Relation::Eq => s.nul.clone(),
                Relation::Ne => s.non_nul(),
            };
            (e, s.exact)
        }
        Condition::Et(a, b) => {
            let (ea, xa) = ensemble_condition(a, r);
            let (eb, xb) = ensemble_condition(b, r);
            (ea.intersection(&eb), xa && xb)
        }
        Condition::Ou(a, b) => {
            let (ea, xa) = ensemble_condition(a, r);
            let (eb, xb) = ensemble_condition(b, r);
            (ea.union(&eb), xa && xb)
        }
    }
}

/// Sélecteur de la branche i : garde_i vraie et aucune garde précédente vraie.
pub fn selecteurs(branches: &[(Expr, Condition)], r: &Reglages) -> Vec<(Ensemble, bool)> {
    let mut deja = Ensemble::vide();
    let mut exact = true;
    let mut out = Vec::with_capacity(branches.len());
    for (_, c) in branches {
        let (e, x) = ensemble_condition(c, r);
        exact &= x;
        out.push((e.difference(&deja), exact));
        deja = deja.union(&e);
    }
    out
}

fn par_morceaux(branches: &[(Expr, Condition)], region: &Ensemble, r: &Reglages) -> Signes {
    let mut out = Signes::vide(true);
    for ((e, _), (sel, exact)) in branches.iter().zip(selecteurs(branches, r)) {
        let s = signes_dans(e, region, r).restreint(&sel);
        let ex = s.exact && exact;
        out = out.reunion(s.avec_exact(ex));
    }
    out
}

/* ------------------------ Repli numérique ------------------------ */

/// Fenêtre dense d’une pièce : la pièce si bornée, sinon ramenée à ±L ;
/// les bornes ouvertes sont rentrées d’une marge. None si elle est trop étroite.
fn fenetre_dense(piece: &Intervalle, r: &Reglages) -> Option<(f64, f64)> {
    let l = r.demi_fenetre;
    let (mut g, mut d) = match (piece.inf.is_finite(), piece.sup.is_finite()) {
        (true, true) => (piece.inf, piece.sup),
        (false, false) => (-l, l),
        (true, false) => (piece.inf, l.max(piece.inf + 2.0 * l)),
        (false, true) => ((-l).min(piece.sup - 2.0 * l), piece.sup),
    };

    let marge = |x: f64| 1e-9 * x.abs().max(1.0);
    if piece.inf.is_finite() && piece.inf_ouvert {
        g += marge(g);
    }
    if piece.sup.is_finite() && piece.sup_ouvert {
        d -= marge(d);
    }
    (g < d).then_some((g, d))
}

/// n points réguliers de [g, d], extrémités comprises (0 exact si la fenêtre est symétrique).
fn reguliers(g: f64, d: f64, n: usize) -> Vec<f64> {
    let n = n.max(2);
    let m = (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { d } else { g + (d - g) * i as f64 / m })
        .collect()
}

/// Points d’échantillonnage d’une pièce : fenêtre dense + queues géométriques.
pub(crate) fn grille(piece: &Intervalle, n: usize, r: &Reglages) -> Vec<f64> {
    if piece.est_vide() {
        return Vec::new();
    }
    if piece.est_point() {
        return vec![piece.inf];
    }
    let Some((g, d)) = fenetre_dense(piece, r) else {
        return vec![0.5 * (piece.inf + piece.sup)];
    };

    let (l, bq) = (r.demi_fenetre, r.borne_queues.max(r.demi_fenetre));
    let mut xs = Vec::with_capacity(n + 160);
    if !piece.inf.is_finite() {
        let mut q = queue(g, -1.0, l, bq);
        q.reverse();
        xs.extend(q);
    }
    xs.extend(reguliers(g, d, n));
    if !piece.sup.is_finite() {
        xs.extend(queue(d, 1.0, l, bq));
    }
    xs
}

fn queue(base: f64, dir: f64, l: f64, bq: f64) -> Vec<f64> {
    // distance jusqu’à ±bq, au moins une fenêtre
    let etendue = (bq - dir * base).max(l);
    let mut out = Vec::new();
    let mut k = 1;
    loop {
        let s = l * (RAISON_QUEUES.powi(k) - 1.0);
        if s >= etendue {
            out.push(base + dir * etendue);
            break;
        }
        out.push(base + dir * s);
        k += 1;
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Classe {
    Pos,
    Neg,
    /// Valeur exactement nulle.
    Zero,
    Indef,
}

impl Classe {
    fn de(v: Option<f64>) -> Self {
        match v {
            None => Classe::Indef,
            Some(v) if v > 0.0 => Classe::Pos,
            Some(v) if v < 0.0 => Classe::Neg,
            Some(_) => Classe::Zero,
        }
    }

    fn signee(self) -> bool {
        matches!(self, Classe::Pos | Classe::Neg)
    }
}

#[derive(Default)]
struct Courses {
    pos: Vec<Intervalle>,
    neg: Vec<Intervalle>,
    nul: Vec<Intervalle>,
    inconnu: Vec<Intervalle>,
    courante: Option<(Classe, f64, bool)>,
}

impl Courses {
    fn ouvre(&mut self, c: Classe, x: f64, ouvert: bool) {
        self.courante = Some((c, x, ouvert));
    }

    fn ferme(&mut self, x: f64, ouvert: bool) {
        if let Some((c, d, d_ouvert)) = self.courante.take() {
            let i = Intervalle::new(d, x, d_ouvert, ouvert);
            match c {
                Classe::Pos => self.pos.push(i),
                Classe::Neg => self.neg.push(i),
                _ => {}
            }
        }
    }

    fn zero(&mut self, x: f64) {
        self.nul.push(Intervalle::point(x));
    }

    /// Coupe la course courante en `t` ; la suivante reprend avec la classe `c`.
    fn coupe(&mut self, t: f64, zero: bool, c: Classe) {
        self.ferme(t, true);
        if zero {
            self.zero(t);
        }
        self.ouvre(c, t, true);
    }

    /// Pièce trop étroite pour une grille : un seul échantillon.
    fn isole(&mut self, c: Classe, x: f64) {
        let i = Intervalle::point(x);
        match c {
            Classe::Pos => self.pos.push(i),
            Classe::Neg => self.neg.push(i),
            Classe::Zero => self.nul.push(i),
            Classe::Indef => {}
        }
    }
}

fn numerique(e: &Expr, region: &Ensemble, r: &Reglages) -> Signes {
    let mut k = Courses::default();
    for piece in region.pieces() {
        courses_piece(e, piece, r, &mut k);
    }
    Signes::new(
        Ensemble::depuis(k.pos),
        Ensemble::depuis(k.neg),
        Ensemble::depuis(k.nul),
        false,
    )
    .avec_inconnu(Ensemble::depuis(k.inconnu))
}

fn courses_piece(e: &Expr, piece: &Intervalle, r: &Reglages, k: &mut Courses) {
    if piece.est_vide() {
        return;
    }
    let Some((g, d)) = fenetre_dense(piece, r) else {
        let x = if piece.est_point() {
            piece.inf
        } else {
            0.5 * (piece.inf + piece.sup)
        };
        k.isole(Classe::de(e.evaluer(x)), x);
        return;
    };

    let xs = reguliers(g, d, r.echantillons_signes);
    let vs: Vec<Option<f64>> = xs.par_iter().map(|&t| e.evaluer(t)).collect();
    let mut cl: Vec<Classe> = vs.iter().map(|&v| Classe::de(v)).collect();
    let n = xs.len();

    // un échantillon de marge représente une borne ouverte : nul, il prend la classe voisine
    if piece.inf.is_finite() && piece.inf_ouvert && cl[0] == Classe::Zero && cl[1].signee() {
        cl[0] = cl[1];
    }
    if piece.sup.is_finite() && piece.sup_ouvert && cl[n - 1] == Classe::Zero && cl[n - 2].signee() {
        cl[n - 1] = cl[n - 2];
    }
    let seuil_creux = r.tolerance_zero.sqrt();

    // début de pièce
    let gauche = if piece.inf.is_finite() {
        Some((piece.inf, piece.inf_ouvert))
    } else if queue_confirmee(e, cl[0], g, -1.0, r) {
        Some((f64::NEG_INFINITY, true))
    } else {
        k.inconnu.push(Intervalle::ouvert(f64::NEG_INFINITY, g));
        None
    };
    match cl[0] {
        c if c.signee() => {
            let (x, ouvert) = gauche.unwrap_or((g, false));
            k.ouvre(c, x, ouvert);
        }
        Classe::Zero => k.zero(g),
        _ => {}
    }

    for i in 1..n {
        let (p, c) = (cl[i - 1], cl[i]);
        let (a, b) = (xs[i - 1], xs[i]);

        match (p, c) {
            (Classe::Zero, Classe::Zero) => k.nul.push(Intervalle::ferme(a, b)),
            (p, c) if p == c => {
                // zéro qui touche l’axe sans le traverser
                if c.signee() && i + 1 < n && cl[i + 1] == c && est_creux(&vs, i, seuil_creux) {
                    if let Some(t) = creux(e, a, xs[i + 1], r) {
                        k.coupe(t, true, c);
                    }
                }
            }
            (p, c) if p.signee() && c.signee() => match bissection_signe(e, a, b, p, r) {
                Frontiere::Zero(t) => k.coupe(t, true, c),
                Frontiere::Trou(t) => k.coupe(t, false, c),
            },
            (p, Classe::Zero) if p.signee() => {
                k.ferme(b, true);
                k.zero(b);
            }
            (p, Classe::Indef) if p.signee() => {
                let t = bissection_definie(e, a, b, r);
                k.ferme(t, false);
            }
            (Classe::Zero, c) if c.signee() => k.ouvre(c, a, true),
            (Classe::Indef, c) if c.signee() => {
                let t = bissection_definie(e, b, a, r);
                k.ouvre(c, t, false);
            }
            (_, Classe::Zero) => k.zero(b),
            _ => {}
        }
    }

    // fin de pièce
    let droite = if piece.sup.is_finite() {
        Some((piece.sup, piece.sup_ouvert))
    } else if queue_confirmee(e, cl[n - 1], d, 1.0, r) {
        Some((f64::INFINITY, true))
    } else {
        k.inconnu.push(Intervalle::ouvert(d, f64::INFINITY));
        None
    };
    if k.courante.is_some() {
        let (x, ouvert) = droite.unwrap_or((d, false));
        k.ferme(x, ouvert);
    }
}

/// Au-delà de `base` (vers -∞ si dir < 0, vers +∞ sinon), le signe reste celui de
/// l’échantillon de bord : la limite l’atteste et toutes les queues le confirment.
/// Vers une limite infinie, un échantillon non évaluable est un dépassement f64.
fn queue_confirmee(e: &Expr, bord: Classe, base: f64, dir: f64, r: &Reglages) -> bool {
    let point = if dir > 0.0 { Point::PlusInfini } else { Point::MoinsInfini };
    let Some(l) = limite(e, point, Cote::Gauche) else {
        return false;
    };
    let attendu = match l {
        l if l > 0.0 => Classe::Pos,
        l if l < 0.0 => Classe::Neg,
        _ => return false,
    };
    if bord != attendu {
        return false;
    }
    let bq = r.borne_queues.max(r.demi_fenetre);
    queue(base, dir, r.demi_fenetre, bq)
        .par_iter()
        .all(|&t| match e.evaluer(t) {
            Some(v) => Classe::de(Some(v)) == attendu,
            None => l.is_infinite(),
        })
}

/// |f(x_i)| petit et minimum local des échantillons.
fn est_creux(vs: &[Option<f64>], i: usize, seuil: f64) -> bool {
    match (vs[i - 1], vs[i], vs[i + 1]) {
        (Some(u), Some(v), Some(w)) => {
            let (u, v, w) = (u.abs(), v.abs(), w.abs());
            v <= seuil && v < u && v <= w
        }
        _ => false,
    }
}

/// Minimum de |f| sur [a, b] (section dorée) ; Some(t) si |f(t)| ≤ tolérance.
fn creux(e: &Expr, mut a: f64, mut b: f64, r: &Reglages) -> Option<f64> {
    for _ in 0..r.iterations_bissection {
        let c = b - PHI * (b - a);
        let d = a + PHI * (b - a);
        if !(a < c && c < d && d < b) {
            break;
        }
        if e.evaluer(c)?.abs() <= e.evaluer(d)?.abs() {
            b = d;
        } else {
            a = c;
        }
    }
    let t = 0.5 * (a + b);
    e.evaluer(t)
        .filter(|v| v.abs() <= r.tolerance_zero)
        .map(|_| t)
}

/// Issue d’une bissection entre deux échantillons de signes opposés.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Frontiere {
    /// f s’annule en t.
    Zero(f64),
    /// f change de signe sans s’annuler : pôle ou trou en t.
    Trou(f64),
}

/// Bissection au signe strict, jusqu’à deux flottants voisins.
fn bissection_signe(e: &Expr, mut a: f64, mut b: f64, ca: Classe, r: &Reglages) -> Frontiere {
    let abs_en = |t: f64| e.evaluer(t).map_or(f64::INFINITY, f64::abs);
    let depart = abs_en(a).min(abs_en(b));

    for _ in 0..r.iterations_bissection {
        // 0 d’abord s’il est encadré : il est atteint en un pas
        let m = if a < 0.0 && b > 0.0 { 0.0 } else { 0.5 * (a + b) };
        if m <= a || m >= b {
            break;
        }
        match Classe::de(e.evaluer(m)) {
            Classe::Indef => return Frontiere::Trou(m),
            Classe::Zero => return Frontiere::Zero(m),
            c if c == ca => a = m,
            _ => b = m,
        }
    }

    // le plus petit |f| décide : il décroît vers un zéro, croît vers un pôle
    let (fa, fb) = (abs_en(a), abs_en(b));
    let (t, ft, loin) = if fa <= fb { (a, fa, b) } else { (b, fb, a) };
    if ft <= r.tolerance_zero || ft < 0.5 * depart {
        Frontiere::Zero(t)
    } else {
        Frontiere::Trou(loin)
    }
}

/// Dernier point défini entre `def` (défini) et `indef` (non défini).
fn bissection_definie(e: &Expr, mut def: f64, mut indef: f64, r: &Reglages) -> f64 {
    for _ in 0..r.iterations_bissection {
        let m = 0.5 * (def + indef);
        if m == def || m == indef {
            break;
        }
        if e.evaluer(m).is_some() {
            def = m;
        } else {
            indef = m;
        }
    }
    def
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::parseur::parse;

    fn s(texte: &str) -> Signes {
        let e = parse(texte).unwrap();
        signes(e.arbre(), &Reglages::default())
    }

    #[test]
    fn polynome_exact() {
        let r = s("x^2 - 4");
        assert!(r.exact);
        assert_eq!(r.negatif.to_string(), "(-2, 2)");
        assert_eq!(r.nul, Ensemble::points(&[-2.0, 2.0]));
    }

    #[test]
    fn racine_et_logarithme() {
        let r = s("sqrt(x)");
        assert!(r.exact);
        assert_eq!(r.positif.to_string(), "(0, ∞)");
        assert_eq!(r.nul, Ensemble::points(&[0.0]));
        assert!(r.negatif.est_vide());

        let r = s("log(x)");
        assert!(r.exact);
        assert_eq!(r.negatif.to_string(), "(0, 1)");
        assert_eq!(r.positif.to_string(), "(1, ∞)");
    }

    #[test]
    fn asin_borne_a_l_intervalle() {
        let r = s("asin(x)");
        assert!(r.exact);
        assert_eq!(r.positif.to_string(), "(0, 1]");
        assert_eq!(r.negatif.to_string(), "[-1, 0)");
    }

    #[test]
    fn sinus_numerique() {
        let r = s("sin(x)");
        assert!(!r.exact);
        let zeros = r.nul.bornes_finies();
        for cible in [0.0, std::f64::consts::PI, -std::f64::consts::PI] {
            assert!(zeros.iter().any(|z| (z - cible).abs() < 1e-12), "zéro {cible} manquant");
        }
        // zéro atteint exactement, sans décalage
        assert!(r.nul.contient(0.0));
        assert!(zeros.iter().all(|z| z.sin().abs() <= 1e-15));
        assert!(r.nul.pieces().iter().all(Intervalle::est_point));
        assert!(r.positif.contient(1.0));
        assert!(r.negatif.contient(-1.0));
    }

    #[test]
    fn hors_fenetre_inconnu() {
        let r = s("sin(x)");
        for x in [20.0, -47.1, 4.7e5] {
            assert!(r.inconnu.contient(x), "{x} devrait être inconnu");
            assert!(!r.defini().contient(x));
        }
        assert!(!r.inconnu.contient(0.5));
        assert!(r.hors_zeros().contient(20.0));

        // limite à l’infini confirmée par les queues
        let r = s("exp(x) - 2");
        assert!(r.inconnu.est_vide());
        assert!(r.positif.contient(1e5));
        assert!(r.negatif.contient(-1e5));

        let r = s("x + sin(x)");
        assert!(r.positif.contient(1e4));
        assert!(r.negatif.contient(-1e4));
    }

    #[test]
    fn zero_cubique_unique() {
        let r = s("x - sin(x)");
        assert_eq!(r.nul, Ensemble::points(&[0.0]));
        assert!(r.positif.contient(1e-3));
        assert!(r.negatif.contient(-1e-3));
    }

    #[test]
    fn zero_tangent_sans_changement_de_signe() {
        let r = s("1 - cos(x)");
        assert!(r.negatif.est_vide());
        assert!(r.nul.pieces().iter().all(Intervalle::est_point));
        let zeros = r.nul.bornes_finies();
        let tau = 2.0 * std::f64::consts::PI;
        for cible in [-tau, 0.0, tau] {
            assert!(zeros.iter().any(|z| (z - cible).abs() < 1e-6), "zéro {cible} manquant");
        }
        assert!(zeros
            .iter()
            .all(|z| ((z / tau).round() * tau - z).abs() < 1e-6));
        assert_eq!(zeros.iter().filter(|z| z.abs() <= 10.0).count(), 3);
    }

    #[test]
    fn pole_distingue_du_zero() {
        let r = s("tan(x)");
        let demi = std::f64::consts::FRAC_PI_2;
        // kπ sont des zéros, (k + ½)π des pôles
        assert!(r.nul.bornes_finies().iter().all(|z| (z.abs() - demi).abs() > 1e-3));
        assert!(r.nul.contient(0.0));
        let bornes = r.positif.bornes_finies();
        assert!(bornes.iter().any(|b| (b - demi).abs() < 1e-12));
        assert!(!r.nul.contient(demi));
    }

    #[test]
    fn somme_mixte_repliee() {
        let r = s("exp(x) - 2");
        assert!(!r.exact);
        assert!(r.positif.contient(1.0));
        assert!(r.negatif.contient(0.0));
        let z = r.nul.bornes_finies();
        assert_eq!(z.len(), 1);
        assert!((z[0] - 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn selecteurs_piecewise() {
        let e = parse("Piecewise((x, x < 0), (x^2, True))").unwrap();
        let Expr::Piecewise(branches) = e.arbre() else {
            panic!("piecewise attendu");
        };
        let sel = selecteurs(branches, &Reglages::default());
        assert_eq!(sel[0].0.to_string(), "(-∞, 0)");
        assert_eq!(sel[1].0.to_string(), "[0, ∞)");
        assert!(sel.iter().all(|(_, exact)| *exact));
    }

    #[test]
    fn grille_avec_queues() {
        let r = Reglages::default();
        let xs = grille(&Intervalle::reels(), 100, &r);
        assert_eq!(xs.first().copied(), Some(-r.borne_queues));
        assert_eq!(xs.last().copied(), Some(r.borne_queues));
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }
}
