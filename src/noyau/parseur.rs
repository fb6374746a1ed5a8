// src/noyau/parseur.rs
//
// Texte -> Expression validée (une seule variable, liste blanche).
// Pipeline : tokenize -> multiplication implicite -> RPN -> AST -> simplify.

use log::debug;

use super::erreurs::ParseError;
use super::expr::Expression;
use super::jetons::{format_tokens, insere_multiplications, tokenize};
use super::liste_blanche::est_reserve;
use super::rpn::{from_rpn, to_rpn};

pub const VARIABLE_PAR_DEFAUT: &str = "x";

/// Analyse `texte` comme fonction de x.
pub fn parse(texte: &str) -> Result<Expression, ParseError> {
    parse_avec_variable(texte, VARIABLE_PAR_DEFAUT)
}

/// Analyse `texte` comme fonction de `variable`.
/// Toute autre variable libre est refusée.
pub fn parse_avec_variable(texte: &str, variable: &str) -> Result<Expression, ParseError> {
    if texte.trim().is_empty() {
        return Err(ParseError::Vide);
    }

    let variable = variable.trim().to_lowercase();
    if variable.is_empty()
        || !variable.chars().all(|c| c.is_ascii_alphabetic())
        || est_reserve(&variable)
    {
        return Err(ParseError::Structure(format!("nom de variable invalide : {variable:?}")));
    }

    let jetons = insere_multiplications(tokenize(texte, &variable)?);
    debug!("jetons : {}", format_tokens(&jetons));

    let rpn = to_rpn(&jetons)?;
    debug!("rpn : {}", format_tokens(&rpn));

    let arbre = from_rpn(&rpn)?.simplify();

    // Contrat : la seule variable libre (si présente) est la variable désignée.
    if let Some(autre) = arbre.variables().into_iter().find(|v| *v != variable) {
        return Err(ParseError::VariableNonPermise {
            trouve: autre,
            attendue: variable,
        });
    }

    debug!("arbre : {arbre}");
    Ok(Expression::new(arbre, variable))
}
