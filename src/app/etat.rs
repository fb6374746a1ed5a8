//! src/app/etat.rs
//!
//! Options du pilote (sans noyau, sans affichage).
//!
//! Rôle : lire la ligne de commande et en tirer une `Requete`.
//!
//! Contrats :
//! - Aucune analyse ici.
//! - Défense en profondeur : le nombre de points du maillage est borné.

use analyseur_fonctions::Requete;
use thiserror::Error;

/// Garde-fou : on borne la densité du maillage (anti-gel).
const POINTS_MAX: usize = 200_000;

pub const USAGE: &str =
    "usage : analyseur-fonctions \"<f(x)>\" [--x <x0>] [--fenetre <min> <max>] [--points <n>] [-v|-vv]";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurOptions {
    #[error("fonction manquante")]
    FonctionManquante,

    #[error("option inconnue : {0}")]
    OptionInconnue(String),

    #[error("valeur manquante après {0}")]
    ValeurManquante(&'static str),

    #[error("nombre invalide pour {option} : {valeur:?}")]
    NombreInvalide { option: &'static str, valeur: String },

    #[error("une seule fonction attendue (reçu aussi {0:?})")]
    FonctionEnTrop(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    pub fonction: String,
    pub x0: Option<f64>,
    pub fenetre: Option<(f64, f64)>,
    /// 0 : densité par défaut des réglages.
    pub points: usize,
    pub verbosite: u8,
}

fn nombre<I: Iterator<Item = String>>(
    args: &mut I,
    option: &'static str,
) -> Result<f64, ErreurOptions> {
    let valeur = args.next().ok_or(ErreurOptions::ValeurManquante(option))?;
    valeur
        .trim()
        .parse::<f64>()
        .map_err(|_| ErreurOptions::NombreInvalide { option, valeur })
}

impl Options {
    pub fn depuis_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ErreurOptions> {
        let mut args = args.into_iter();
        let mut o = Options::default();
        let mut fonction: Option<String> = None;

        while let Some(a) = args.next() {
            match a.as_str() {
                "--x" => o.x0 = Some(nombre(&mut args, "--x")?),
                "--fenetre" => {
                    let a = nombre(&mut args, "--fenetre")?;
                    let b = nombre(&mut args, "--fenetre")?;
                    o.fenetre = Some((a, b));
                }
                "--points" => {
                    let valeur = args.next().ok_or(ErreurOptions::ValeurManquante("--points"))?;
                    let n = valeur.trim().parse::<usize>().map_err(|_| ErreurOptions::NombreInvalide {
                        option: "--points",
                        valeur,
                    })?;
                    o.points = n.min(POINTS_MAX);
                }
                "-v" => o.verbosite = o.verbosite.max(1),
                "-vv" => o.verbosite = 2,
                // "-3" ou "-x" sont des fonctions, pas des options
                s if s.starts_with("--") => return Err(ErreurOptions::OptionInconnue(a)),
                _ => match fonction {
                    None => fonction = Some(a),
                    Some(_) => return Err(ErreurOptions::FonctionEnTrop(a)),
                },
            }
        }

        o.fonction = fonction.ok_or(ErreurOptions::FonctionManquante)?;
        Ok(o)
    }

    pub fn requete(&self) -> Requete {
        let mut q = Requete::new(self.fonction.clone()).avec_points(self.points);
        if let Some(x0) = self.x0 {
            q = q.avec_x0(x0);
        }
        if let Some((a, b)) = self.fenetre {
            q = q.avec_fenetre(a, b);
        }
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lire(args: &[&str]) -> Result<Options, ErreurOptions> {
        Options::depuis_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn options_completes() {
        let o = lire(&["x^2 - 4", "--x", "2", "--fenetre", "-5", "5", "--points", "300", "-v"]).unwrap();
        assert_eq!(o.fonction, "x^2 - 4");
        assert_eq!(o.x0, Some(2.0));
        assert_eq!(o.fenetre, Some((-5.0, 5.0)));
        assert_eq!(o.points, 300);
        assert_eq!(o.verbosite, 1);

        let q = o.requete();
        assert_eq!(q.x0, Some(2.0));
        assert_eq!(q.fenetre, Some((-5.0, 5.0)));
    }

    #[test]
    fn points_bornes() {
        let o = lire(&["x", "--points", "999999999"]).unwrap();
        assert_eq!(o.points, POINTS_MAX);
    }

    #[test]
    fn erreurs() {
        assert_eq!(lire(&[]), Err(ErreurOptions::FonctionManquante));
        assert_eq!(lire(&["x", "--x"]), Err(ErreurOptions::ValeurManquante("--x")));
        assert!(matches!(lire(&["x", "--x", "deux"]), Err(ErreurOptions::NombreInvalide { .. })));
        assert!(matches!(lire(&["x", "--zoom"]), Err(ErreurOptions::OptionInconnue(_))));
        assert!(matches!(lire(&["x", "y"]), Err(ErreurOptions::FonctionEnTrop(_))));
    }

    #[test]
    fn fonction_negative_acceptee() {
        let o = lire(&["-x", "--x", "-1"]).unwrap();
        assert_eq!(o.fonction, "-x");
        assert_eq!(o.x0, Some(-1.0));
    }
}
