//! Réglages de l’analyse (densités d’échantillonnage, tolérances, heuristiques).
//!
//! Contrats :
//! - Aucune valeur n’est lue depuis un état global : chaque appel reçoit ses réglages.
//! - `normalise()` borne les comptes (anti-gel), comme la précision ΣLocal était bornée.

/// Bornes des comptes d’échantillons.
const ECHANTILLONS_MIN: usize = 16;
pub(crate) const ECHANTILLONS_MAX: usize = 200_000;

/// Bissection : au-delà, on ne gagne plus rien en f64.
const BISSECTION_MAX: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub struct Reglages {
    /// Repli numérique de l’image : nombre total d’échantillons.
    pub echantillons_image: usize,
    /// Repli numérique du signe (domaine, racines) : points sur la fenêtre dense.
    pub echantillons_signes: usize,
    /// Demi-largeur L de la fenêtre dense [-L, L] sur les côtés non bornés.
    pub demi_fenetre: f64,
    /// Les queues géométriques vont de L jusqu’à ±borne_queues.
    pub borne_queues: f64,
    /// Au-delà (en valeur absolue), une enveloppe échantillonnée est déclarée non bornée.
    pub seuil_infini: f64,
    /// Un zéro numérique n’est retenu que si |f| y tombe sous ce seuil
    /// (ou s’effondre pendant la bissection).
    pub tolerance_zero: f64,
    /// Deux racines plus proches que ça sont fusionnées.
    pub tolerance_racines: f64,
    pub iterations_bissection: usize,
    /// Maillage : un pas |Δy| plus grand que `seuil_saut` × pas voisins coupe le segment.
    pub seuil_saut: f64,
    /// Densité de maillage par défaut (pilote).
    pub echantillons_maillage: usize,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            echantillons_image: 5000,
            echantillons_signes: 4000,
            demi_fenetre: 10.0,
            borne_queues: 1e6,
            seuil_infini: 1e8,
            tolerance_zero: 1e-9,
            tolerance_racines: 1e-7,
            iterations_bissection: 100,
            seuil_saut: 50.0,
            echantillons_maillage: 1600,
        }
    }
}

impl Reglages {
    pub fn avec_echantillons_image(mut self, n: usize) -> Self {
        self.echantillons_image = n;
        self
    }

    pub fn avec_echantillons_signes(mut self, n: usize) -> Self {
        self.echantillons_signes = n;
        self
    }

    pub fn avec_demi_fenetre(mut self, l: f64) -> Self {
        self.demi_fenetre = l;
        self
    }

    pub fn avec_seuil_saut(mut self, s: f64) -> Self {
        self.seuil_saut = s;
        self
    }

    pub fn avec_echantillons_maillage(mut self, n: usize) -> Self {
        self.echantillons_maillage = n;
        self
    }

    /// Garde-fou : ramène chaque champ dans un intervalle sûr.
    /// Une valeur non finie ou négative reprend la valeur par défaut.
    pub fn normalise(mut self) -> Self {
        let d = Reglages::default();

        self.echantillons_image = self.echantillons_image.clamp(ECHANTILLONS_MIN, ECHANTILLONS_MAX);
        self.echantillons_signes = self.echantillons_signes.clamp(ECHANTILLONS_MIN, ECHANTILLONS_MAX);
        self.echantillons_maillage = self.echantillons_maillage.clamp(2, ECHANTILLONS_MAX);
        self.iterations_bissection = self.iterations_bissection.clamp(1, BISSECTION_MAX);

        let positif = |v: f64, defaut: f64| if v.is_finite() && v > 0.0 { v } else { defaut };
        self.demi_fenetre = positif(self.demi_fenetre, d.demi_fenetre);
        self.borne_queues = positif(self.borne_queues, d.borne_queues).max(self.demi_fenetre);
        self.seuil_infini = positif(self.seuil_infini, d.seuil_infini);
        self.tolerance_zero = positif(self.tolerance_zero, d.tolerance_zero);
        self.tolerance_racines = positif(self.tolerance_racines, d.tolerance_racines);
        self.seuil_saut = positif(self.seuil_saut, d.seuil_saut);
        self
    }
}
