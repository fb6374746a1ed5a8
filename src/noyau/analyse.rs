// src/noyau/analyse.rs
//
// Analyse complète d’une requête.
// parse -> domaine (échecs terminaux) puis, en parallèle (rayon::join) :
// image, intersections, évaluation en x0 (si x0 ∈ D), maillage (si fenêtre).
// Un volet en échec n’empêche jamais les autres.

use log::{info, warn};

use super::domaine::{domain, restrictions, Domaine};
use super::erreurs::{ErreurAnalyse, EvaluationError, RangeWindowError};
use super::eval::{evaluate, Evaluation};
use super::expr::Expression;
use super::image::{range, ImageResult};
use super::intersections::{intercepts, Intersections};
use super::maillage::{build_mesh, Segment};
use super::parseur::parse_avec_variable;
use super::reglages::Reglages;

#[derive(Clone, Debug, PartialEq)]
pub struct Requete {
    pub texte: String,
    pub variable: String,
    pub x0: Option<f64>,
    pub fenetre: Option<(f64, f64)>,
    /// Points du maillage (0 : densité des réglages).
    pub points: usize,
}

impl Requete {
    pub fn new(texte: impl Into<String>) -> Self {
        Self {
            texte: texte.into(),
            variable: super::parseur::VARIABLE_PAR_DEFAUT.to_string(),
            x0: None,
            fenetre: None,
            points: 0,
        }
    }

    pub fn avec_x0(mut self, x0: f64) -> Self {
        self.x0 = Some(x0);
        self
    }

    pub fn avec_fenetre(mut self, x_min: f64, x_max: f64) -> Self {
        self.fenetre = Some((x_min, x_max));
        self
    }

    pub fn avec_points(mut self, n: usize) -> Self {
        self.points = n;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultatPoint {
    Evalue(Evaluation),
    HorsDomaine(f64),
    Echec(EvaluationError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rapport {
    pub expression: Expression,
    pub domaine: Domaine,
    pub restrictions: Vec<String>,
    pub image: ImageResult,
    pub intersections: Intersections,
    pub evaluation: Option<ResultatPoint>,
    pub maillage: Option<Result<Vec<Segment>, RangeWindowError>>,
}

pub fn analyser(requete: &Requete, reglages: &Reglages) -> Result<Rapport, ErreurAnalyse> {
    let r = reglages.clone().normalise();

    let expression = parse_avec_variable(&requete.texte, &requete.variable)?;
    let domaine = domain(&expression, &r)?;
    info!("analyse de {expression} : domaine {domaine}");

    let ((image, intersections), (evaluation, maillage)) = rayon::join(
        || {
            rayon::join(
                || range(&expression, &domaine, &r),
                || intercepts(&expression, &domaine, &r),
            )
        },
        || {
            rayon::join(
                || requete.x0.map(|x0| point(&expression, &domaine, x0)),
                || {
                    requete.fenetre.map(|(a, b)| {
                        let n = if requete.points == 0 {
                            r.echantillons_maillage
                        } else {
                            requete.points
                        };
                        build_mesh(&expression, &domaine, a, b, n, &r)
                    })
                },
            )
        },
    );

    if let Some(Err(e)) = &maillage {
        warn!("maillage de {expression} : {e}");
    }
    info!(
        "analyse de {expression} terminée : image {} ({})",
        image.ensemble,
        if image.est_exacte() { "exacte" } else { "approchée" }
    );

    Ok(Rapport {
        restrictions: restrictions(&expression),
        expression,
        domaine,
        image,
        intersections,
        evaluation,
        maillage,
    })
}

fn point(expression: &Expression, domaine: &Domaine, x0: f64) -> ResultatPoint {
    if !x0.is_finite() {
        return ResultatPoint::Echec(EvaluationError::PointNonFini(format!("{x0}")));
    }
    if !domaine.contient(x0) {
        return ResultatPoint::HorsDomaine(x0);
    }
    match evaluate(expression, x0) {
        Ok(ev) => ResultatPoint::Evalue(ev),
        Err(e) => {
            warn!("évaluation de {expression} en {x0} : {e}");
            ResultatPoint::Echec(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::erreurs::ParseError;

    fn analyse(q: Requete) -> Rapport {
        analyser(&q, &Reglages::default()).unwrap()
    }

    #[test]
    fn rapport_complet() {
        let rap = analyse(Requete::new("x^2 - 4").avec_x0(2.0).avec_fenetre(-5.0, 5.0).avec_points(100));
        assert!(rap.domaine.ensemble().est_reels());
        assert!(rap.restrictions.is_empty());
        assert_eq!(rap.image.ensemble.to_string(), "[-4, ∞)");
        assert_eq!(rap.intersections.axe_x.len(), 2);
        match rap.evaluation {
            Some(ResultatPoint::Evalue(ev)) => assert_eq!(ev.valeur, 0.0),
            autre => panic!("évaluation attendue, reçu {autre:?}"),
        }
        let segs = rap.maillage.unwrap().unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].points.len(), 100);
    }

    #[test]
    fn x0_hors_domaine() {
        let rap = analyse(Requete::new("log(x)").avec_x0(-1.0));
        assert_eq!(rap.evaluation, Some(ResultatPoint::HorsDomaine(-1.0)));
        assert_eq!(rap.restrictions, vec!["logarithme : x > 0".to_string()]);
    }

    #[test]
    fn volets_isoles() {
        // fenêtre invalide : seule la partie maillage échoue
        let rap = analyse(Requete::new("1/x").avec_fenetre(3.0, -3.0));
        assert!(matches!(rap.maillage, Some(Err(RangeWindowError::FenetreInvalide { .. }))));
        assert!(rap.image.est_exacte());
        assert!(rap.evaluation.is_none());
    }

    #[test]
    fn erreurs_terminales() {
        let e = analyser(&Requete::new("x + y"), &Reglages::default());
        assert!(matches!(
            e,
            Err(ErreurAnalyse::Parse(ParseError::VariableNonPermise { .. }))
        ));
        assert!(matches!(
            analyser(&Requete::new("  "), &Reglages::default()),
            Err(ErreurAnalyse::Parse(ParseError::Vide))
        ));
    }
}
