// src/app/vue.rs
//
// Vue (rapport texte) — une section par volet :
// 1) fonction, 2) domaine + restrictions, 3) image + méthode,
// 4) intersections avec les axes, 5) évaluation en x0, 6) maillage (si fenêtre)
//
// Note : aucun calcul ici, seulement de la mise en forme du Rapport.

use std::fmt::Write as _;

use analyseur_fonctions::{ErreurAnalyse, Intercept, Rapport, Reglages, ResultatPoint};

fn titre(out: &mut String, n: usize, t: &str) {
    let _ = writeln!(out, "\n{n}) {t}");
}

fn points(xs: &[Intercept]) -> String {
    xs.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub fn rapport(r: &Rapport, reglages: &Reglages) -> String {
    let mut out = String::new();

    titre(&mut out, 1, "Fonction");
    let _ = writeln!(out, "   {}", r.expression);

    titre(&mut out, 2, "Domaine");
    let _ = writeln!(
        out,
        "   D = {}{}",
        r.domaine,
        if r.domaine.est_exact() { "" } else { "  (bornes approchées)" }
    );
    if r.restrictions.is_empty() {
        let _ = writeln!(out, "   restrictions : aucune");
    } else {
        let _ = writeln!(out, "   restrictions :");
        for t in &r.restrictions {
            let _ = writeln!(out, "     - {t}");
        }
    }

    titre(&mut out, 3, "Image");
    let _ = writeln!(
        out,
        "   f(D) = {}  ({})",
        r.image.ensemble,
        if r.image.est_exacte() { "exacte" } else { "approchée" }
    );
    let _ = writeln!(out, "   méthode :");
    for l in r.image.methode() {
        let _ = writeln!(out, "     - {l}");
    }

    titre(&mut out, 4, "Intersections avec les axes");
    let i = &r.intersections;
    if i.axe_x.is_empty() {
        let _ = write!(out, "   axe des x : aucune");
    } else {
        let _ = write!(out, "   axe des x : {}", points(&i.axe_x));
    }
    if !i.axe_x_exact {
        let l = reglages.demi_fenetre;
        let _ = write!(out, "  (recherche numérique, fenêtre [-{l}, {l}])");
    }
    let _ = writeln!(out);
    match &i.axe_y {
        Some(p) => {
            let _ = writeln!(out, "   axe des y : {p}");
        }
        None => {
            let _ = writeln!(out, "   axe des y : aucune");
        }
    }

    titre(&mut out, 5, "Évaluation");
    match &r.evaluation {
        None => {
            let _ = writeln!(out, "   (aucun x0 fourni)");
        }
        Some(ResultatPoint::HorsDomaine(x0)) => {
            let _ = writeln!(out, "   x0 = {x0} : x0 hors domaine");
        }
        Some(ResultatPoint::Echec(e)) => {
            let _ = writeln!(out, "   évaluation impossible : {e}");
        }
        Some(ResultatPoint::Evalue(ev)) => {
            for l in &ev.etapes {
                let _ = writeln!(out, "   {l}");
            }
        }
    }

    if let Some(m) = &r.maillage {
        titre(&mut out, 6, "Maillage");
        match m {
            Ok(segs) => {
                let n: usize = segs.iter().map(|s| s.points.len()).sum();
                let _ = writeln!(out, "   {} segment(s), {n} point(s)", segs.len());
                for s in segs {
                    if let (Some(a), Some(b)) = (s.premier(), s.dernier()) {
                        let _ = writeln!(out, "     x ∈ [{}, {}]", a.0, b.0);
                    }
                }
            }
            Err(e) => {
                let _ = writeln!(out, "   tracé ignoré : {e}");
            }
        }
    }

    out
}

pub fn erreur(fonction: &str, e: &ErreurAnalyse) -> String {
    format!("f(x) = {fonction}\n{e}")
}
