// src/noyau/ensemble.rs
//
// Réunions finies d’intervalles réels (bornes f64, ±∞ permis).
// Invariant d’Ensemble : intervalles non vides, disjoints, non adjacents
// (sinon fusionnés), triés par borne inférieure.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intervalle {
    pub inf: f64,
    pub sup: f64,
    pub inf_ouvert: bool,
    pub sup_ouvert: bool,
}

impl Intervalle {
    /// Une borne infinie est toujours ouverte.
    pub fn new(inf: f64, sup: f64, inf_ouvert: bool, sup_ouvert: bool) -> Self {
        Self {
            inf,
            sup,
            inf_ouvert: inf_ouvert || inf.is_infinite(),
            sup_ouvert: sup_ouvert || sup.is_infinite(),
        }
    }

    pub fn ferme(inf: f64, sup: f64) -> Self {
        Self::new(inf, sup, false, false)
    }

    pub fn ouvert(inf: f64, sup: f64) -> Self {
        Self::new(inf, sup, true, true)
    }

    pub fn point(x: f64) -> Self {
        Self::ferme(x, x)
    }

    pub fn reels() -> Self {
        Self::ouvert(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn est_vide(&self) -> bool {
        if self.inf.is_nan() || self.sup.is_nan() {
            return true;
        }
        self.inf > self.sup || (self.inf == self.sup && (self.inf_ouvert || self.sup_ouvert))
    }

    pub fn est_point(&self) -> bool {
        !self.est_vide() && self.inf == self.sup
    }

    pub fn est_borne(&self) -> bool {
        self.inf.is_finite() && self.sup.is_finite()
    }

    pub fn contient(&self, x: f64) -> bool {
        let apres_inf = x > self.inf || (x == self.inf && !self.inf_ouvert);
        let avant_sup = x < self.sup || (x == self.sup && !self.sup_ouvert);
        apres_inf && avant_sup
    }

    /// x strictement à l’intérieur.
    pub fn interieur(&self, x: f64) -> bool {
        x > self.inf && x < self.sup
    }

    pub fn intersection(&self, autre: &Intervalle) -> Intervalle {
        let (inf, inf_ouvert) = if self.inf > autre.inf {
            (self.inf, self.inf_ouvert)
        } else if autre.inf > self.inf {
            (autre.inf, autre.inf_ouvert)
        } else {
            (self.inf, self.inf_ouvert || autre.inf_ouvert)
        };
        let (sup, sup_ouvert) = if self.sup < autre.sup {
            (self.sup, self.sup_ouvert)
        } else if autre.sup < self.sup {
            (autre.sup, autre.sup_ouvert)
        } else {
            (self.sup, self.sup_ouvert || autre.sup_ouvert)
        };
        Intervalle::new(inf, sup, inf_ouvert, sup_ouvert)
    }
}

impl fmt::Display for Intervalle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.est_point() {
            return write!(f, "{{{}}}", borne(self.inf));
        }
        let g = if self.inf_ouvert { '(' } else { '[' };
        let d = if self.sup_ouvert { ')' } else { ']' };
        write!(f, "{g}{}, {}{d}", borne(self.inf), borne(self.sup))
    }
}

fn borne(x: f64) -> String {
    if x == f64::INFINITY {
        "∞".to_string()
    } else if x == f64::NEG_INFINITY {
        "-∞".to_string()
    } else if x == 0.0 {
        "0".to_string()
    } else {
        format!("{x}")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ensemble {
    intervalles: Vec<Intervalle>,
}

impl Ensemble {
    pub fn vide() -> Self {
        Self::default()
    }

    pub fn reels() -> Self {
        Self {
            intervalles: vec![Intervalle::reels()],
        }
    }

    pub fn intervalle(i: Intervalle) -> Self {
        Self::depuis(vec![i])
    }

    pub fn points(xs: &[f64]) -> Self {
        Self::depuis(xs.iter().map(|&x| Intervalle::point(x)).collect())
    }

    /// Normalise une liste quelconque : retire les vides, trie, fusionne.
    pub fn depuis(mut v: Vec<Intervalle>) -> Self {
        v.retain(|i| !i.est_vide());
        v.sort_by(|a, b| {
            a.inf
                .total_cmp(&b.inf)
                .then(a.inf_ouvert.cmp(&b.inf_ouvert))
        });

        let mut out: Vec<Intervalle> = Vec::with_capacity(v.len());
        for i in v {
            match out.last_mut() {
                Some(c) if c.sup > i.inf || (c.sup == i.inf && !(c.sup_ouvert && i.inf_ouvert)) => {
                    if i.sup > c.sup {
                        c.sup = i.sup;
                        c.sup_ouvert = i.sup_ouvert;
                    } else if i.sup == c.sup {
                        c.sup_ouvert = c.sup_ouvert && i.sup_ouvert;
                    }
                }
                _ => out.push(i),
            }
        }
        Self { intervalles: out }
    }

    pub fn pieces(&self) -> &[Intervalle] {
        &self.intervalles
    }

    pub fn est_vide(&self) -> bool {
        self.intervalles.is_empty()
    }

    pub fn est_reels(&self) -> bool {
        self.intervalles.len() == 1 && self.intervalles[0] == Intervalle::reels()
    }

    pub fn contient(&self, x: f64) -> bool {
        self.indice_piece(x).is_some()
    }

    /// Indice de la pièce contenant x.
    pub fn indice_piece(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        // pièces triées : on s’arrête dès qu’une borne inf dépasse x
        self.intervalles
            .iter()
            .take_while(|i| i.inf <= x)
            .position(|i| i.contient(x))
    }

    pub fn union(&self, autre: &Ensemble) -> Ensemble {
        let mut v = self.intervalles.clone();
        v.extend_from_slice(&autre.intervalles);
        Ensemble::depuis(v)
    }

    pub fn intersection(&self, autre: &Ensemble) -> Ensemble {
        let mut v = Vec::new();
        for a in &self.intervalles {
            for b in &autre.intervalles {
                let c = a.intersection(b);
                if !c.est_vide() {
                    v.push(c);
                }
            }
        }
        Ensemble::depuis(v)
    }

    pub fn complement(&self) -> Ensemble {
        let mut v = Vec::with_capacity(self.intervalles.len() + 1);
        let mut gauche = f64::NEG_INFINITY;
        let mut gauche_ouvert = true;
        for i in &self.intervalles {
            v.push(Intervalle::new(gauche, i.inf, gauche_ouvert, !i.inf_ouvert));
            gauche = i.sup;
            gauche_ouvert = !i.sup_ouvert;
        }
        v.push(Intervalle::new(gauche, f64::INFINITY, gauche_ouvert, true));
        Ensemble::depuis(v)
    }

    pub fn difference(&self, autre: &Ensemble) -> Ensemble {
        self.intersection(&autre.complement())
    }

    /// (inf, sup) de l’enveloppe convexe.
    pub fn enveloppe(&self) -> Option<(f64, f64)> {
        let premier = self.intervalles.first()?;
        let dernier = self.intervalles.last()?;
        Some((premier.inf, dernier.sup))
    }

    /// Points isolés et bornes finies : utile pour lister des racines.
    pub fn bornes_finies(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for i in &self.intervalles {
            if i.inf.is_finite() {
                out.push(i.inf);
            }
            if i.sup.is_finite() && i.sup != i.inf {
                out.push(i.sup);
            }
        }
        out
    }
}

impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.est_vide() {
            return write!(f, "∅");
        }
        if self.est_reels() {
            return write!(f, "ℝ");
        }
        for (k, i) in self.intervalles.iter().enumerate() {
            if k > 0 {
                write!(f, " ∪ ")?;
            }
            write!(f, "{i}")?;
        }
        Ok(())
    }
}
