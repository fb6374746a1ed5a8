//! Noyau d’analyse de fonctions réelles d’une variable
//!
//! Organisation interne :
//! - expr.rs          : AST exact + simplify + évaluation flottante
//! - liste_blanche.rs : fonctions et constantes permises
//! - jetons.rs        : tokenisation + multiplication implicite
//! - rpn.rs           : shunting-yard + construction Expr
//! - parseur.rs       : texte -> Expression validée
//! - trig.rs          : angles spéciaux + indéfini
//! - ensemble.rs      : réunions d’intervalles
//! - polynome.rs      : polynômes sur ℚ, Sturm, fractions rationnelles
//! - signes.rs        : décomposition de signe (exacte ou échantillonnée)
//! - domaine.rs       : domaine de définition + restrictions
//! - derivee.rs       : dérivée symbolique
//! - limites.rs       : limites unilatérales sur les réels étendus
//! - image.rs         : image (exacte ou approchée)
//! - intersections.rs : intersections avec les axes
//! - eval.rs          : évaluation en un point, avec démarche
//! - maillage.rs      : segments prêts à tracer
//! - analyse.rs       : requête complète
//! - reglages.rs      : densités, tolérances, heuristiques
//! - erreurs.rs       : erreurs typées

pub mod analyse;
pub mod derivee;
pub mod domaine;
pub mod ensemble;
pub mod erreurs;
pub mod eval;
pub mod expr;
pub mod image;
pub mod intersections;
pub mod jetons;
pub mod limites;
pub mod liste_blanche;
pub mod maillage;
pub mod parseur;
pub mod polynome;
pub mod reglages;
pub mod rpn;
pub mod signes;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

#[cfg(test)]
mod tests_proprietes;

// API publique
pub use analyse::{analyser, Rapport, Requete, ResultatPoint};
pub use domaine::{domain, restrictions, Domaine};
pub use ensemble::{Ensemble, Intervalle};
pub use erreurs::{
    DomainError, ErreurAnalyse, EvaluationError, ParseError, RangeComputationError,
    RangeWindowError,
};
pub use eval::{evaluate, Evaluation};
pub use expr::{Expr, Expression};
pub use image::{range, Exactitude, ImageResult};
pub use intersections::{intercepts, Intercept, Intersections};
pub use maillage::{build_mesh, Segment};
pub use parseur::{parse, parse_avec_variable};
pub use reglages::Reglages;
