// src/app.rs
//
// Pilote terminal — module App (racine)
// -------------------------------------
// Rôle :
// - Déclarer les sous-modules (etat.rs : options, vue.rs : rapport texte)
// - Exécuter une requête d’analyse et choisir le code de sortie

pub mod etat;
pub mod vue;

pub use etat::{Options, USAGE};

use std::process::ExitCode;

use analyseur_fonctions::{analyser, Reglages};
use log::error;

/// Analyse + affichage. 0 : rapport produit ; 1 : erreur terminale (parser / domaine).
pub fn executer(options: &Options) -> ExitCode {
    let reglages = Reglages::default();
    match analyser(&options.requete(), &reglages) {
        Ok(rapport) => {
            print!("{}", vue::rapport(&rapport, &reglages));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            println!("{}", vue::erreur(&options.fonction, &e));
            ExitCode::FAILURE
        }
    }
}
