// src/noyau/erreurs.rs
//
// Erreurs typées du noyau.
// - ParseError / DomainError : terminales pour une requête
// - RangeComputationError     : interne (image.rs), toujours rétrogradée en échantillonnage
// - EvaluationError           : par requête, non fatale
// - RangeWindowError          : fenêtre de tracé invalide

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("la fonction est vide")]
    Vide,

    #[error("l’expression contient des symboles non permis : {0:?}")]
    SyntaxeInterdite(String),

    #[error("caractère inattendu : '{0}'")]
    CaractereInattendu(char),

    #[error("nombre invalide : {0}")]
    NombreInvalide(String),

    #[error("fonction inconnue : {0}")]
    FonctionInconnue(String),

    #[error("seule la variable {attendue} est permise (trouvé : {trouve})")]
    VariableNonPermise { trouve: String, attendue: String },

    #[error("impossible d’interpréter la fonction : {0}")]
    Structure(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("expression trop grosse pour l’analyse ({noeuds} noeuds, max {max})")]
    ExpressionTropGrosse { noeuds: usize, max: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RangeComputationError {
    #[error("aucune forme close : {0}")]
    NonTraitable(&'static str),

    #[error("limite indéterminée")]
    LimiteIndeterminee,

    #[error("signe de la dérivée non exact")]
    DeriveeNonExacte,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("point non fini : {0}")]
    PointNonFini(String),

    #[error("division par zéro")]
    DivisionParZero,

    #[error("résultat non réel : {0}")]
    NonReel(&'static str),

    #[error("résultat indéterminé")]
    Indeterminee,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum RangeWindowError {
    #[error("la fenêtre x est invalide : [{min}, {max}]")]
    FenetreInvalide { min: f64, max: f64 },

    #[error("au moins 2 échantillons requis (reçu {0})")]
    EchantillonsInsuffisants(usize),

    #[error("trop d’échantillons : {n} (max {max})")]
    EchantillonsExcessifs { n: usize, max: usize },
}

/// Échecs terminaux d’une analyse complète (analyse.rs).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurAnalyse {
    #[error("erreur de parser : {0}")]
    Parse(#[from] ParseError),

    #[error("erreur de domaine : {0}")]
    Domaine(#[from] DomainError),
}
